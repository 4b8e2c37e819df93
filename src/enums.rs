//! Closed enumerations used in emitted OSCAL documents.
//!
//! Only the values this crate produces are listed. Open OSCAL vocabularies
//! (property names, resource types) are plain strings.

use serde::{Deserialize, Serialize};

/// Determination recorded on a finding's target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectiveState {
    Satisfied,
    NotSatisfied,
}

/// How evidence for an observation was gathered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObservationMethod {
    Examine,
    Interview,
    Test,
    Unknown,
}

/// What an observation describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObservationType {
    SspStatementIssue,
    ControlObjective,
    Mitigation,
    Finding,
    Historic,
}

/// Kind of thing a finding target points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingTargetType {
    StatementId,
    ObjectiveId,
}

/// Address classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressType {
    Home,
    Work,
}

/// Operational state of a locally defined component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentState {
    UnderDevelopment,
    Operational,
    Disposition,
    Other,
}

/// Kind of subject reviewed by the assessment plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubjectType {
    Component,
    InventoryItem,
    Location,
    Party,
    User,
}

/// Party classification in document metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartyType {
    Person,
    Organization,
}

/// Rendering used when documents are written to disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}
