//! Conversion settings.
//!
//! Every member has a default, so a config file only needs the values it
//! overrides:
//!
//! ```yaml
//! convert:
//!   namespace: "https://example.org/ns/scuba/"
//!   marking: "Controlled Unclassified Information"
//!   format: yaml
//! profile:
//!   scuba-version: "1.3.0"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::enums::OutputFormat;
use crate::error::{ConvertError, Result};

pub const OSCAL_VERSION: &str = "1.1.2";
pub const DEFAULT_NAMESPACE: &str = "https://github.com/cisagov/ScubaGear/tree/main/oscal/ns/";
pub const DEFAULT_REPOSITORY: &str = "https://github.com/cisagov/ScubaGear";
pub const DEFAULT_MARKING: &str = "Controlled Unclassified Information";

/// Settings for `convert`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConversionOptions {
    /// URI scoping every tool-defined property.
    pub namespace: String,
    /// Document marking property. `None` omits it.
    pub marking: Option<String>,
    /// Link recorded in back-matter for the assessment tool.
    pub repository_url: String,
    pub oscal_version: String,
    pub format: OutputFormat,
    /// File stem of the assessment plan.
    pub plan_file_stem: String,
    /// File stem of the assessment results.
    pub results_file_stem: String,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        ConversionOptions {
            namespace: DEFAULT_NAMESPACE.to_string(),
            marking: Some(DEFAULT_MARKING.to_string()),
            repository_url: DEFAULT_REPOSITORY.to_string(),
            oscal_version: OSCAL_VERSION.to_string(),
            format: OutputFormat::Json,
            plan_file_stem: "sap".to_string(),
            results_file_stem: "sar".to_string(),
        }
    }
}

impl ConversionOptions {
    pub fn plan_file_name(&self) -> String {
        format!("{}.{}", self.plan_file_stem, self.format.extension())
    }

    pub fn results_file_name(&self) -> String {
        format!("{}.{}", self.results_file_stem, self.format.extension())
    }
}

/// Settings for `profile`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProfileOptions {
    /// Baseline release the profile describes.
    pub scuba_version: String,
    pub oscal_version: String,
    /// Where the 800-53 catalog is found, relative to the profile.
    pub catalog_href: String,
    pub publisher_name: String,
    pub publisher_email: String,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        ProfileOptions {
            scuba_version: "1.3.0".to_string(),
            oscal_version: OSCAL_VERSION.to_string(),
            catalog_href: "./NIST_SP-800-53_rev5_catalog.json".to_string(),
            publisher_name: "Cybersecurity and Infrastructure Security Agency".to_string(),
            publisher_email: "CyberSharedServices@cisa.dhs.gov".to_string(),
        }
    }
}

/// Both option sets, as stored in one config file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub convert: ConversionOptions,
    pub profile: ProfileOptions,
}

impl Config {
    /// Parse a YAML config document.
    pub fn from_yaml(input: &str) -> std::result::Result<Config, String> {
        if input.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_saphyr::from_str(input).map_err(|e| e.to_string())
    }

    /// Load a YAML config file.
    pub fn load(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        let config = Config::from_yaml(&text).map_err(|message| ConvertError::Config {
            path: path.to_path_buf(),
            message,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}
