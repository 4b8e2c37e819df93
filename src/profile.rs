//! OSCAL profile selecting the NIST SP 800-53 rev5 controls that the SCuBA
//! baselines map onto.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::path::Path;

use crate::config::ProfileOptions;
use crate::enums::PartyType;
use crate::error::{ConvertError, Result};
use crate::ids::{WellKnownSubject, fragment_href, new_id, well_known_id};
use crate::types::*;

const CATALOG_MEDIA_TYPE: &str = "application/oscal.catalog+json";

/// Policy id → mapped 800-53 control ids, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlMapping {
    entries: Vec<(String, Vec<String>)>,
}

impl ControlMapping {
    /// Parse `{"MS.AAD.1.1v1": ["ac-7", "si-4"], ...}`.
    pub fn from_json(input: &str) -> std::result::Result<ControlMapping, String> {
        let value: Value = serde_json::from_str(input).map_err(|e| e.to_string())?;
        let object: &Map<String, Value> = value
            .as_object()
            .ok_or_else(|| "mapping must be a JSON object".to_string())?;

        let mut entries = Vec::with_capacity(object.len());
        for (policy, controls) in object {
            let controls = controls
                .as_array()
                .ok_or_else(|| format!("{} must map to a list of control ids", policy))?
                .iter()
                .map(|c| {
                    c.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| format!("{} lists a non-string control id", policy))
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            entries.push((policy.clone(), controls));
        }
        Ok(ControlMapping { entries })
    }

    pub fn load(path: &Path) -> Result<ControlMapping> {
        let text = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        ControlMapping::from_json(&text).map_err(|message| ConvertError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn push(&mut self, policy: impl Into<String>, controls: Vec<String>) {
        self.entries.push((policy.into(), controls));
    }

    /// Every mapped control id, first occurrence wins.
    pub fn control_ids(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.entries
            .iter()
            .flat_map(|(_, controls)| controls.iter())
            .filter(|id| seen.insert(id.to_string()))
            .cloned()
            .collect()
    }
}

/// Build the profile document. `now` becomes `last-modified`.
pub fn build_profile(
    mapping: &ControlMapping,
    options: &ProfileOptions,
    now: DateTime<Utc>,
) -> Result<ProfileDocument> {
    let with_ids = mapping.control_ids();
    if with_ids.is_empty() {
        return Err(ConvertError::Config {
            path: "control mapping".into(),
            message: "no control ids mapped; a profile must include at least one".to_string(),
        });
    }

    let publisher = well_known_id(WellKnownSubject::Publisher);
    let catalog = new_id();

    let metadata = Metadata {
        title: format!(
            "NIST Special Publication 800-53 Revision 5 SCuBA M365 {} Profile",
            options.scuba_version
        ),
        published: None,
        last_modified: now.to_rfc3339_opts(SecondsFormat::Micros, true),
        version: options.scuba_version.clone(),
        oscal_version: options.oscal_version.clone(),
        props: None,
        roles: Some(vec![
            Role {
                id: "creator".to_string(),
                title: "Document Creator".to_string(),
                description: None,
            },
            Role {
                id: "contact".to_string(),
                title: "Contact".to_string(),
                description: None,
            },
        ]),
        locations: None,
        parties: Some(vec![Party {
            uuid: publisher,
            kind: PartyType::Organization,
            name: options.publisher_name.clone(),
            email_addresses: Some(vec![options.publisher_email.clone()]),
        }]),
        responsible_parties: Some(
            ["creator", "contact"]
                .into_iter()
                .map(|role| ResponsibleParty {
                    role_id: role.to_string(),
                    party_uuids: vec![publisher],
                })
                .collect(),
        ),
    };

    tracing::info!(controls = with_ids.len(), "built 800-53 profile");

    Ok(ProfileDocument {
        profile: Profile {
            uuid: new_id(),
            metadata,
            imports: vec![Import {
                href: fragment_href(catalog),
                include_controls: Some(vec![SelectControls { with_ids }]),
            }],
            merge: Some(Merge { as_is: Some(true) }),
            back_matter: Some(BackMatter {
                resources: vec![Resource {
                    uuid: catalog,
                    title: None,
                    description: Some(
                        "NIST Special Publication 800-53 Revision 5: Security and Privacy Controls for Federal Information Systems and Organizations"
                            .to_string(),
                    ),
                    props: None,
                    rlinks: Some(vec![Rlink {
                        href: options.catalog_href.clone(),
                        media_type: Some(CATALOG_MEDIA_TYPE.to_string()),
                    }]),
                }],
            }),
        },
    })
}
