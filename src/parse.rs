use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::raw::RawResults;

const METADATA_FIELDS: [&str; 10] = [
    "DisplayName",
    "TenantId",
    "DomainName",
    "Tool",
    "ToolVersion",
    "TimestampZulu",
    "ProductsAssessed",
    "ProductAbbreviationMapping",
    "AgencyName",
    "SubAgencyName",
];

const CONTROL_FIELDS: [&str; 5] = ["Control ID", "Criticality", "Details", "Requirement", "Result"];

const ADDRESS_FIELDS: [&str; 5] = ["Street", "City", "State", "CountryLetterCode", "PostalCode"];

/// Read and parse a results file from disk.
pub fn parse_file(path: &Path) -> Result<RawResults> {
    let bytes = std::fs::read(path).map_err(|e| ConvertError::io(path, e))?;
    let text = String::from_utf8(bytes).map_err(|e| ConvertError::InputParse {
        message: format!("{} is not valid UTF-8: {}", path.display(), e),
        source: None,
    })?;
    parse(&text)
}

/// Parse a results document.
///
/// Accepts a leading byte-order mark. Checks that every member the
/// conversion reads is present, so failures name the missing path instead of
/// surfacing as a generic type error. Does NOT check abbreviations against
/// `Results`; that happens during assembly.
pub fn parse(input: &str) -> Result<RawResults> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    if input.trim().is_empty() {
        return Err(ConvertError::InputParse {
            message: "empty input".to_string(),
            source: None,
        });
    }

    let value: Value = serde_json::from_str(input).map_err(|e| ConvertError::InputParse {
        message: e.to_string(),
        source: Some(e),
    })?;

    let root = value.as_object().ok_or_else(|| ConvertError::InputParse {
        message: "document root must be a JSON object".to_string(),
        source: None,
    })?;

    check_metadata(root)?;
    check_results(root)?;
    check_tenants(root)?;

    serde_json::from_value(value).map_err(|e| ConvertError::InputParse {
        message: e.to_string(),
        source: Some(e),
    })
}

fn check_metadata(root: &Map<String, Value>) -> Result<()> {
    let metadata = object_at(root, "MetaData")?;
    for field in METADATA_FIELDS {
        if !metadata.contains_key(field) {
            return Err(ConvertError::missing(format!("MetaData.{}", field)));
        }
    }
    Ok(())
}

fn check_results(root: &Map<String, Value>) -> Result<()> {
    let results = object_at(root, "Results")?;
    for (abbr, groups) in results {
        let path = format!("Results.{}", abbr);
        let groups = groups.as_array().ok_or_else(|| ConvertError::InputParse {
            message: format!("{} must be a list of control groups", path),
            source: None,
        })?;
        for (i, group) in groups.iter().enumerate() {
            let group_path = format!("{}[{}]", path, i);
            let controls = group
                .get("Controls")
                .ok_or_else(|| ConvertError::missing(format!("{}.Controls", group_path)))?
                .as_array()
                .ok_or_else(|| ConvertError::InputParse {
                    message: format!("{}.Controls must be a list", group_path),
                    source: None,
                })?;
            for (j, control) in controls.iter().enumerate() {
                check_control(control, &format!("{}.Controls[{}]", group_path, j))?;
            }
        }
    }
    Ok(())
}

fn check_control(control: &Value, path: &str) -> Result<()> {
    for field in CONTROL_FIELDS {
        let present = control.get(field).is_some_and(Value::is_string);
        if !present {
            return Err(ConvertError::MalformedControl {
                path: path.to_string(),
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

fn check_tenants(root: &Map<String, Value>) -> Result<()> {
    let raw = object_at(root, "Raw")?;
    let tenants = raw
        .get("tenant_details")
        .ok_or_else(|| ConvertError::missing("Raw.tenant_details"))?
        .as_array()
        .ok_or_else(|| ConvertError::InputParse {
            message: "Raw.tenant_details must be a list".to_string(),
            source: None,
        })?;

    for (i, tenant) in tenants.iter().enumerate() {
        let path = format!("Raw.tenant_details[{}]", i);
        if tenant.get("DisplayName").is_none() {
            return Err(ConvertError::missing(format!("{}.DisplayName", path)));
        }
        let address_path = format!("{}.AADAdditionalData", path);
        let address = tenant
            .get("AADAdditionalData")
            .and_then(Value::as_object)
            .ok_or_else(|| ConvertError::missing(address_path.clone()))?;
        for field in ADDRESS_FIELDS {
            if !address.contains_key(field) {
                return Err(ConvertError::missing(format!("{}.{}", address_path, field)));
            }
        }
    }
    Ok(())
}

fn object_at<'a>(parent: &'a Map<String, Value>, key: &str) -> Result<&'a Map<String, Value>> {
    match parent.get(key) {
        None => Err(ConvertError::missing(key)),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(ConvertError::InputParse {
            message: format!("{} must be a JSON object", key),
            source: None,
        }),
    }
}
