#![allow(dead_code)]

use serde_json::{Value, json};

pub const TIMESTAMP: &str = "2024-05-01T12:00:00.000Z";

pub fn control(id: &str, criticality: &str, result: &str) -> Value {
    json!({
        "Control ID": id,
        "Criticality": criticality,
        "Result": result,
        "Details": format!("Details for {}", id),
        "Requirement": format!("{} requirement SHALL be met.\n<!--Policy: {}; Criticality: {} -->\n", id, id, criticality),
    })
}

pub fn tenant(display_name: &str) -> Value {
    json!({
        "DisplayName": display_name,
        "AADAdditionalData": {
            "Street": "1 Main St",
            "City": "Arlington",
            "State": "VA",
            "CountryLetterCode": "US",
            "PostalCode": "22201"
        }
    })
}

/// A results file with the given products. Each product is
/// `(display name, abbreviation, groups)`, where each group is a list of controls.
pub fn raw_results(products: &[(&str, &str, Vec<Vec<Value>>)]) -> Value {
    let assessed: Vec<&str> = products.iter().map(|(name, _, _)| *name).collect();
    let mut mapping = serde_json::Map::new();
    let mut results = serde_json::Map::new();
    for (name, abbr, groups) in products {
        mapping.insert(name.to_string(), json!(abbr));
        let groups: Vec<Value> = groups
            .iter()
            .enumerate()
            .map(|(i, controls)| {
                json!({
                    "GroupName": format!("Group {}", i + 1),
                    "Controls": controls,
                })
            })
            .collect();
        results.insert(abbr.to_string(), Value::Array(groups));
    }

    json!({
        "MetaData": {
            "DisplayName": "Contoso",
            "TenantId": "00000000-1111-2222-3333-444444444444",
            "DomainName": "contoso.onmicrosoft.com",
            "Tool": "ScubaGear",
            "ToolVersion": "1.3.0",
            "TimestampZulu": TIMESTAMP,
            "ProductsAssessed": assessed,
            "ProductAbbreviationMapping": mapping,
            "AgencyName": "Example Agency",
            "SubAgencyName": "Example Office"
        },
        "Results": results,
        "Raw": {
            "tenant_details": [tenant("Contoso")]
        }
    })
}

/// One product `"Exchange Online"` / `EXO` with one passing `Shall` control and
/// one `Not-Implemented` control.
pub fn exo_scenario() -> Value {
    raw_results(&[(
        "Exchange Online",
        "EXO",
        vec![vec![
            control("MS.EXO.1.1v1", "Shall", "Pass"),
            control("MS.EXO.2.1v1", "Not-Implemented", "N/A"),
        ]],
    )])
}

pub fn context() -> scuba_oscal::LinkContext {
    scuba_oscal::LinkContext {
        input_path: "reports/ScubaResults.json".into(),
        output_dir: "reports/oscal".into(),
    }
}

pub fn convert(value: &Value) -> scuba_oscal::Converted {
    scuba_oscal::convert(
        &value.to_string(),
        &context(),
        &scuba_oscal::ConversionOptions::default(),
    )
    .expect("conversion should succeed")
}
