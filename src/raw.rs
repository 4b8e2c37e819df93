//! The assessment tool's results file, as read from disk.
//!
//! Only the members the conversion reads are modelled; everything else in the
//! file is ignored. Values are never mutated after parsing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::normalize::normalize_or;

/// Name used for the assessment tool when the results file leaves it blank.
pub const DEFAULT_TOOL: &str = "ScubaGear";

/// Top-level input document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawResults {
    #[serde(rename = "MetaData")]
    pub metadata: RunMetadata,
    /// Product abbreviation → control groups.
    #[serde(rename = "Results")]
    pub results: HashMap<String, Vec<ControlGroup>>,
    #[serde(rename = "Raw")]
    pub raw: RawProviderData,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunMetadata {
    pub display_name: String,
    pub tenant_id: String,
    pub domain_name: String,
    pub tool: String,
    pub tool_version: String,
    pub timestamp_zulu: String,
    /// Assessed products by display name, in assessment order.
    pub products_assessed: Vec<String>,
    /// Product display name → abbreviation used as the key in `Results`.
    pub product_abbreviation_mapping: HashMap<String, String>,
    pub agency_name: String,
    pub sub_agency_name: String,
}

impl RunMetadata {
    /// Display name fit for a title: single-line and trimmed, falling back to
    /// the tenant id and then to a generic label when blank.
    pub fn tenant_label(&self) -> String {
        normalize_or(
            &self.display_name,
            &normalize_or(&self.tenant_id, "M365 tenant"),
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ControlGroup {
    #[serde(rename = "GroupName", default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(rename = "Controls")]
    pub controls: Vec<Control>,
}

/// One checked baseline policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    #[serde(rename = "Control ID")]
    pub control_id: String,
    #[serde(rename = "Criticality")]
    pub criticality: String,
    #[serde(rename = "Details")]
    pub details: String,
    #[serde(rename = "Requirement")]
    pub requirement: String,
    #[serde(rename = "Result")]
    pub result: String,
}

impl Control {
    /// The literal result value that marks a passing check.
    pub const PASS: &'static str = "Pass";

    pub fn passed(&self) -> bool {
        self.result == Self::PASS
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawProviderData {
    pub tenant_details: Vec<TenantRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TenantRecord {
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    #[serde(rename = "AADAdditionalData")]
    pub aad_additional_data: TenantAddress,
}

/// Mailing address as reported by the directory. Any member may be null.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TenantAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country_letter_code: Option<String>,
    pub postal_code: Option<String>,
}
