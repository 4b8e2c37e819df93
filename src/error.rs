use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// How much a validation finding matters. Only warnings are reported as
/// [`Diagnostic`]s; errors become [`ValidationError`]s.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A finding that does not stop the conversion, such as `empty-result` (a
/// product whose controls were all excluded) or `no-location` (a document
/// without the tenant's address). `convert` logs each one and returns them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

/// A broken rule in the generated plan/results pair, e.g. `duplicate-uuid`
/// or `observation-pairing`. `path` is dotted from the document root:
/// `assessment-results.results[0].findings[2]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub rule: String,
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.rule, self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Everything `validate` found. The pair is written only when `errors` is empty.
#[derive(Clone, Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Every way a conversion run can fail. None of these are recovered locally.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input was not JSON, or a value had the wrong type.
    #[error("failed to parse input: {message}")]
    InputParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A required key is absent.
    #[error("missing required field: {path}")]
    MissingField { path: String },

    /// An assessed product has no entry in `MetaData.ProductAbbreviationMapping`.
    #[error("no abbreviation for product '{product}' in MetaData.ProductAbbreviationMapping")]
    MissingAbbreviation { product: String },

    /// A control record lacks one of `Control ID`, `Criticality`, `Details`, `Requirement`, `Result`.
    #[error("malformed control at {path}: missing or non-string '{field}'")]
    MalformedControl { path: String, field: String },

    /// No tenant record has the assessed tenant's display name.
    #[error("no entry in Raw.tenant_details has DisplayName '{display_name}'")]
    MissingTenantRecord { display_name: String },

    /// More than one tenant record has the assessed tenant's display name.
    #[error("{count} entries in Raw.tenant_details have DisplayName '{display_name}'")]
    AmbiguousTenantRecord { display_name: String, count: usize },

    /// The assembled documents failed one or more structural checks.
    #[error("assembled documents failed validation: {}", summarize(.0))]
    Validation(Vec<ValidationError>),

    /// A configuration or mapping file could not be understood.
    #[error("invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A document could not be rendered.
    #[error("failed to serialize {what}: {message}")]
    Serialize { what: String, message: String },

    /// Filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn missing(path: impl Into<String>) -> Self {
        ConvertError::MissingField { path: path.into() }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "no errors recorded".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
