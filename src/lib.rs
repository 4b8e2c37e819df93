//! Convert SCuBA M365 baseline assessment results into NIST
//! [OSCAL](https://pages.nist.gov/OSCAL/) 1.1.2 documents.
//!
//! One results file becomes a Security Assessment Plan and a Security
//! Assessment Results document that reference each other (and a system
//! security plan that is maintained elsewhere) by identifier:
//!
//! ```text
//! parse(json) → RawResults → assemble → DocumentPair → link → validate → serialize
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use scuba_oscal::{ConversionOptions, LinkContext};
//!
//! let input = r#"{
//!   "MetaData": {
//!     "DisplayName": "Contoso", "TenantId": "t-1", "DomainName": "contoso.com",
//!     "Tool": "ScubaGear", "ToolVersion": "1.3.0",
//!     "TimestampZulu": "2024-05-01T12:00:00.000Z",
//!     "ProductsAssessed": ["Exchange Online"],
//!     "ProductAbbreviationMapping": {"Exchange Online": "EXO"},
//!     "AgencyName": "Agency", "SubAgencyName": "Office"
//!   },
//!   "Results": {"EXO": [{"Controls": [{
//!     "Control ID": "MS.EXO.1.1v1", "Criticality": "Shall", "Result": "Pass",
//!     "Details": "Requirement met", "Requirement": "Automatic forwarding SHALL be disabled."
//!   }]}]},
//!   "Raw": {"tenant_details": [{"DisplayName": "Contoso", "AADAdditionalData": {
//!     "Street": "1 Main St", "City": "Arlington", "State": "VA",
//!     "CountryLetterCode": "US", "PostalCode": "22201"}}]}
//! }"#;
//!
//! let context = LinkContext {
//!     input_path: "results/ScubaResults.json".into(),
//!     output_dir: "oscal".into(),
//! };
//! let converted = scuba_oscal::convert(input, &context, &ConversionOptions::default())
//!     .expect("valid input");
//! assert_eq!(converted.pair.results.results.len(), 1);
//! ```

pub mod assemble;
pub mod classify;
pub mod config;
pub mod dns;
pub mod enums;
pub mod error;
pub mod ids;
pub mod link;
pub mod normalize;
pub mod parse;
pub mod profile;
pub mod raw;
pub mod serialize;
pub mod types;
pub mod validate;

pub use error::*;
pub use types::*;

// Re-export entry-point functions at the crate root for convenience.
pub use assemble::{DocumentPair, assemble};
pub use config::{Config, ConversionOptions, ProfileOptions};
pub use link::{LinkContext, link};
pub use parse::parse;
pub use validate::validate;

use std::path::Path;

/// Result of the [`convert`] convenience entry point.
pub struct Converted {
    /// The linked plan and results documents.
    pub pair: DocumentPair,
    /// Non-fatal findings from validation.
    pub warnings: Vec<Diagnostic>,
}

/// Convenience entry point composing parse → assemble → link → validate.
///
/// Products are processed in `MetaData.ProductsAssessed` order.
///
/// # Errors
///
/// Returns the first parse, assembly or linking error, or
/// [`ConvertError::Validation`] carrying every structural error found.
pub fn convert(
    input: &str,
    context: &LinkContext,
    options: &ConversionOptions,
) -> Result<Converted> {
    let raw = parse::parse(input)?;
    convert_raw(&raw, context, options)
}

/// [`convert`] for input that is already parsed.
pub fn convert_raw(
    raw: &raw::RawResults,
    context: &LinkContext,
    options: &ConversionOptions,
) -> Result<Converted> {
    let mut pair = assemble::assemble(raw, &raw.metadata.products_assessed, options)?;
    link::link(&mut pair, raw, context, options)?;

    let result = validate::validate(&pair);
    if !result.is_valid() {
        return Err(ConvertError::Validation(result.errors));
    }
    for warning in &result.warnings {
        tracing::warn!(code = %warning.code, path = ?warning.path, "{}", warning.message);
    }

    Ok(Converted {
        pair,
        warnings: result.warnings,
    })
}

/// Convert the results file at `input_path` and write the plan and results
/// into `output_dir`. Both documents are rendered in memory before either
/// file is touched.
pub fn convert_file(
    input_path: &Path,
    output_dir: &Path,
    options: &ConversionOptions,
) -> Result<Converted> {
    let raw = parse::parse_file(input_path)?;
    let context = LinkContext {
        input_path: input_path.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
    };
    let converted = convert_raw(&raw, &context, options)?;

    let plan = serialize::render(&converted.pair.plan_document(), options.format)?;
    let results = serialize::render(&converted.pair.results_document(), options.format)?;

    std::fs::create_dir_all(output_dir).map_err(|e| ConvertError::io(output_dir, e))?;
    serialize::write_all(&[
        (output_dir.join(options.plan_file_name()), plan),
        (output_dir.join(options.results_file_name()), results),
    ])?;

    Ok(converted)
}
