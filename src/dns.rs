//! E-mail authentication record lookups (DMARC, SPF, DKIM).
//!
//! Each helper issues TXT queries through a caller-supplied [`TxtResolver`].
//! DMARC and SPF return the first record carrying their version tag, or an
//! empty string. DKIM returns every answer under every selector. Resolver
//! failures are logged at debug level and treated as "no record"; nothing is
//! retried or cached.
//!
//! No resolver ships with the crate and the binary has no lookup command.

use std::fmt;
use tracing::debug;

/// Selectors Microsoft 365 publishes DKIM keys under.
pub const M365_DKIM_SELECTORS: [&str; 2] = ["selector1", "selector2"];

/// A failed TXT lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupError {
    pub name: String,
    pub message: String,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TXT lookup for {} failed: {}", self.name, self.message)
    }
}

impl std::error::Error for LookupError {}

/// Something that can answer TXT queries. Each returned string is one
/// record, with multi-string records already concatenated.
pub trait TxtResolver {
    fn txt(&self, name: &str) -> Result<Vec<String>, LookupError>;
}

impl<F> TxtResolver for F
where
    F: Fn(&str) -> Result<Vec<String>, LookupError>,
{
    fn txt(&self, name: &str) -> Result<Vec<String>, LookupError> {
        self(name)
    }
}

/// The DMARC policy published at `_dmarc.<domain>`.
pub fn get_dmarc(domain: &str, resolver: &dyn TxtResolver) -> String {
    find_record(resolver, &format!("_dmarc.{}", domain), "v=DMARC1")
}

/// The SPF policy published at `<domain>`.
pub fn get_spf(domain: &str, resolver: &dyn TxtResolver) -> String {
    find_record(resolver, domain, "v=spf1")
}

/// Every TXT answer published under the M365 DKIM selectors, in selector
/// order. Selectors that fail to resolve contribute nothing.
pub fn get_dkim(domain: &str, resolver: &dyn TxtResolver) -> Vec<String> {
    dkim_selectors(domain)
        .iter()
        .flat_map(|selector| get_dkim_for_selector(domain, selector, resolver))
        .collect()
}

/// The TXT answers published at `<selector>._domainkey.<domain>`.
pub fn get_dkim_for_selector(
    domain: &str,
    selector: &str,
    resolver: &dyn TxtResolver,
) -> Vec<String> {
    let name = format!("{}._domainkey.{}", selector, domain);
    resolver.txt(&name).unwrap_or_else(|e| {
        debug!(error = %e, "lookup failed");
        Vec::new()
    })
}

/// The fixed M365 selectors, then the same selectors suffixed with the
/// dash-joined domain (`selector1-contoso-com`).
pub fn dkim_selectors(domain: &str) -> Vec<String> {
    let dashed = domain.replace('.', "-");
    M365_DKIM_SELECTORS
        .iter()
        .map(|selector| selector.to_string())
        .chain(
            M365_DKIM_SELECTORS
                .iter()
                .map(|selector| format!("{}-{}", selector, dashed)),
        )
        .collect()
}

fn find_record(resolver: &dyn TxtResolver, name: &str, version_tag: &str) -> String {
    let records = match resolver.txt(name) {
        Ok(records) => records,
        Err(e) => {
            debug!(error = %e, "lookup failed");
            return String::new();
        }
    };
    records
        .into_iter()
        .find(|record| has_version_tag(record, version_tag))
        .unwrap_or_default()
}

/// Tag-value records start with their version tag; the tag name is
/// case-insensitive and may be followed by `;` or whitespace.
fn has_version_tag(record: &str, version_tag: &str) -> bool {
    let record = record.trim_start();
    let Some(head) = record.get(..version_tag.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(version_tag) {
        return false;
    }
    record[version_tag.len()..]
        .chars()
        .next()
        .is_none_or(|c| c == ';' || c.is_whitespace())
}
