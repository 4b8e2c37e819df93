//! Identifier allocation.
//!
//! Per-run artifacts (documents, results, observations, findings, platforms,
//! back-matter resources) get a fresh random identifier on every call. A small
//! set of real-world subjects keep the same identifier in every run and every
//! process, so separate outputs can be correlated on them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A 128-bit OSCAL identifier, rendered as dash-grouped lowercase hex.
pub type Identifier = Uuid;

/// Subjects whose identifier never changes between runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WellKnownSubject {
    /// The shell that hosts the assessment tool.
    ScriptingEngine,
    /// The engine that evaluates baseline policies.
    PolicyEngine,
    /// The assessment tool itself.
    AssessmentTool,
    /// The organization publishing the baseline profile.
    Publisher,
}

impl WellKnownSubject {
    pub const ALL: [WellKnownSubject; 4] = [
        WellKnownSubject::ScriptingEngine,
        WellKnownSubject::PolicyEngine,
        WellKnownSubject::AssessmentTool,
        WellKnownSubject::Publisher,
    ];

    /// The constant identifier, as a raw value. Every value is a well-formed
    /// version 4 UUID.
    const fn raw_id(self) -> u128 {
        match self {
            WellKnownSubject::ScriptingEngine => 0x5d3f_8a1c_7b2e_4c09_9e6a_3f1d_2b7c_8e40,
            WellKnownSubject::PolicyEngine => 0x0c6e_94d2_1f57_4a3b_8d10_6b5e_f2a9_c713,
            WellKnownSubject::AssessmentTool => 0xa47b_2e90_c35d_4f16_b8e2_09d4_7a61_5fc2,
            WellKnownSubject::Publisher => 0xe1f0_63b8_9a4c_4d27_a5f3_c8b0_1e96_d254,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WellKnownSubject::ScriptingEngine => "scripting-engine",
            WellKnownSubject::PolicyEngine => "policy-engine",
            WellKnownSubject::AssessmentTool => "assessment-tool",
            WellKnownSubject::Publisher => "publisher",
        }
    }
}

impl fmt::Display for WellKnownSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a subject name is not in the well-known table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownSubject(pub String);

impl fmt::Display for UnknownSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown well-known subject '{}'", self.0)
    }
}

impl std::error::Error for UnknownSubject {}

impl FromStr for WellKnownSubject {
    type Err = UnknownSubject;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WellKnownSubject::ALL
            .into_iter()
            .find(|subject| subject.as_str() == s)
            .ok_or_else(|| UnknownSubject(s.to_string()))
    }
}

/// Mint a fresh random identifier.
pub fn new_id() -> Identifier {
    Uuid::new_v4()
}

/// The constant identifier for a well-known subject.
pub fn well_known_id(subject: WellKnownSubject) -> Identifier {
    Uuid::from_u128(subject.raw_id())
}

/// Every well-known identifier, in [`WellKnownSubject::ALL`] order.
pub fn well_known_ids() -> impl Iterator<Item = (WellKnownSubject, Identifier)> {
    WellKnownSubject::ALL
        .into_iter()
        .map(|subject| (subject, well_known_id(subject)))
}

/// An href that points at a back-matter resource (or sibling document) by identifier.
pub fn fragment_href(id: Identifier) -> String {
    format!("#{}", id)
}

/// Inverse of [`fragment_href`]. Returns `None` for anything but `#<uuid>`.
pub fn parse_fragment_href(href: &str) -> Option<Identifier> {
    href.strip_prefix('#').and_then(|rest| Uuid::parse_str(rest).ok())
}
