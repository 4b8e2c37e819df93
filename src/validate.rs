//! Structural checks over an assembled plan/results pair.
//!
//! This is not OSCAL schema validation. It checks the properties the
//! conversion itself promises: identifiers are well-formed and defined once
//! across both documents, every finding is paired with exactly one
//! observation of the same result, and every `#uuid` reference resolves.
//! Returns **all** errors and warnings, not just the first.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::assemble::DocumentPair;
use crate::config::OSCAL_VERSION;
use crate::error::*;
use crate::ids::{Identifier, parse_fragment_href, well_known_ids};
use crate::types::*;

// ─── Cached regexes ─────────────────────────────────────────────────────────

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[45][0-9A-Fa-f]{3}-[89ABab][0-9A-Fa-f]{3}-[0-9A-Fa-f]{12}$",
    )
    .unwrap()
});

static STRING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\S(.*\S)?$").unwrap());

/// Validate a freshly assembled and linked pair.
pub fn validate(pair: &DocumentPair) -> ValidationResult {
    validate_documents(&pair.plan, &pair.results)
}

/// Validate a plan and results document that are meant to reference each other.
pub fn validate_documents(plan: &AssessmentPlan, results: &AssessmentResults) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_oscal_version(plan, results, &mut errors);
    check_identifiers(plan, results, &mut errors);
    check_imports(plan, results, &mut errors);
    check_sibling_references(plan, results, &mut errors);
    check_observation_pairing(results, &mut errors);
    check_exclusions(results, &mut errors);
    check_strings(plan, results, &mut errors);
    warn_empty_results(results, &mut warnings);
    warn_missing_locations(plan, results, &mut warnings);

    ValidationResult { errors, warnings }
}

fn error(rule: &str, path: impl Into<String>, message: impl Into<String>) -> ValidationError {
    ValidationError {
        rule: rule.to_string(),
        path: path.into(),
        message: message.into(),
    }
}

// ─── oscal-version ──────────────────────────────────────────────────────────

fn check_oscal_version(
    plan: &AssessmentPlan,
    results: &AssessmentResults,
    errors: &mut Vec<ValidationError>,
) {
    for (path, version) in [
        ("assessment-plan.metadata.oscal-version", &plan.metadata.oscal_version),
        ("assessment-results.metadata.oscal-version", &results.metadata.oscal_version),
    ] {
        if version != OSCAL_VERSION {
            errors.push(error(
                "oscal-version",
                path,
                format!("expected {}, found {}", OSCAL_VERSION, version),
            ));
        }
    }
}

// ─── uuid-format / duplicate-uuid ───────────────────────────────────────────

fn check_identifiers(
    plan: &AssessmentPlan,
    results: &AssessmentResults,
    errors: &mut Vec<ValidationError>,
) {
    let mut defined = Vec::new();
    collect_plan_ids(plan, results.uuid, &mut defined);
    collect_results_ids(results, plan.uuid, &mut defined);

    let well_known: HashSet<Identifier> = well_known_ids().map(|(_, id)| id).collect();
    let mut seen: HashMap<Identifier, &str> = HashMap::new();

    for (path, id) in &defined {
        if !UUID_RE.is_match(&id.to_string()) {
            errors.push(error(
                "uuid-format",
                path.as_str(),
                format!("{} is not a version 4 or 5 UUID", id),
            ));
        }
        if let Some(first) = seen.insert(*id, path.as_str()) {
            errors.push(error(
                "duplicate-uuid",
                path.as_str(),
                format!("{} is already defined at {}", id, first),
            ));
        }
    }

    // Components use the well-known table; anything else that collides with it
    // was minted wrong.
    for (path, id) in &defined {
        if well_known.contains(id) && !path.contains(".components[") {
            errors.push(error(
                "duplicate-uuid",
                path.as_str(),
                format!("{} is reserved for a well-known subject", id),
            ));
        }
    }
}

fn collect_metadata_ids(prefix: &str, metadata: &Metadata, out: &mut Vec<(String, Identifier)>) {
    for (i, location) in metadata.locations.iter().flatten().enumerate() {
        out.push((format!("{}.metadata.locations[{}]", prefix, i), location.uuid));
    }
    for (i, party) in metadata.parties.iter().flatten().enumerate() {
        out.push((format!("{}.metadata.parties[{}]", prefix, i), party.uuid));
    }
}

/// Back-matter resources, minus the one that stands in for the sibling document.
fn collect_resource_ids(
    prefix: &str,
    back_matter: Option<&BackMatter>,
    sibling: Identifier,
    out: &mut Vec<(String, Identifier)>,
) {
    for (i, resource) in back_matter.iter().flat_map(|bm| bm.resources.iter()).enumerate() {
        if resource.uuid != sibling {
            out.push((format!("{}.back-matter.resources[{}]", prefix, i), resource.uuid));
        }
    }
}

fn collect_assets_ids(prefix: &str, assets: &AssessmentAssets, out: &mut Vec<(String, Identifier)>) {
    for (i, component) in assets.components.iter().flatten().enumerate() {
        out.push((format!("{}.components[{}]", prefix, i), component.uuid));
    }
    for (i, platform) in assets.assessment_platforms.iter().enumerate() {
        out.push((format!("{}.assessment-platforms[{}]", prefix, i), platform.uuid));
    }
}

fn collect_plan_ids(
    plan: &AssessmentPlan,
    results_id: Identifier,
    out: &mut Vec<(String, Identifier)>,
) {
    let prefix = "assessment-plan";
    out.push((prefix.to_string(), plan.uuid));
    collect_metadata_ids(prefix, &plan.metadata, out);
    if let Some(local) = &plan.local_definitions {
        for (i, component) in local.components.iter().enumerate() {
            out.push((
                format!("{}.local-definitions.components[{}]", prefix, i),
                component.uuid,
            ));
        }
    }
    if let Some(assets) = &plan.assessment_assets {
        collect_assets_ids(&format!("{}.assessment-assets", prefix), assets, out);
    }
    collect_resource_ids(prefix, plan.back_matter.as_ref(), results_id, out);
}

fn collect_results_ids(
    results: &AssessmentResults,
    plan_id: Identifier,
    out: &mut Vec<(String, Identifier)>,
) {
    let prefix = "assessment-results";
    out.push((prefix.to_string(), results.uuid));
    collect_metadata_ids(prefix, &results.metadata, out);
    for (r, result) in results.results.iter().enumerate() {
        let rp = format!("{}.results[{}]", prefix, r);
        out.push((rp.clone(), result.uuid));
        if let Some(assets) = result
            .local_definitions
            .as_ref()
            .and_then(|local| local.assessment_assets.as_ref())
        {
            collect_assets_ids(&format!("{}.local-definitions.assessment-assets", rp), assets, out);
        }
        for (i, entry) in result.assessment_log.iter().flat_map(|log| log.entries.iter()).enumerate() {
            out.push((format!("{}.assessment-log.entries[{}]", rp, i), entry.uuid));
        }
        for (i, observation) in result.observations.iter().enumerate() {
            out.push((format!("{}.observations[{}]", rp, i), observation.uuid));
        }
        for (i, finding) in result.findings.iter().enumerate() {
            out.push((format!("{}.findings[{}]", rp, i), finding.uuid));
        }
    }
    collect_resource_ids(prefix, results.back_matter.as_ref(), plan_id, out);
}

// ─── import-href ────────────────────────────────────────────────────────────

fn resolves(href: &str, back_matter: Option<&BackMatter>) -> bool {
    let Some(target) = parse_fragment_href(href) else {
        return false;
    };
    back_matter.is_some_and(|bm| bm.resources.iter().any(|r| r.uuid == target))
}

fn check_imports(
    plan: &AssessmentPlan,
    results: &AssessmentResults,
    errors: &mut Vec<ValidationError>,
) {
    if !resolves(&plan.import_ssp.href, plan.back_matter.as_ref()) {
        errors.push(error(
            "import-href",
            "assessment-plan.import-ssp.href",
            format!(
                "{} does not resolve to a back-matter resource",
                plan.import_ssp.href
            ),
        ));
    }
    if !resolves(&results.import_ap.href, results.back_matter.as_ref()) {
        errors.push(error(
            "import-href",
            "assessment-results.import-ap.href",
            format!(
                "{} does not resolve to a back-matter resource",
                results.import_ap.href
            ),
        ));
    }
}

// ─── sibling-reference ──────────────────────────────────────────────────────

fn check_sibling_references(
    plan: &AssessmentPlan,
    results: &AssessmentResults,
    errors: &mut Vec<ValidationError>,
) {
    if parse_fragment_href(&results.import_ap.href) != Some(plan.uuid) {
        errors.push(error(
            "sibling-reference",
            "assessment-results.import-ap.href",
            format!("expected #{}, found {}", plan.uuid, results.import_ap.href),
        ));
    }
    let plan_lists_results = plan
        .back_matter
        .as_ref()
        .is_some_and(|bm| bm.resources.iter().any(|r| r.uuid == results.uuid));
    if !plan_lists_results {
        errors.push(error(
            "sibling-reference",
            "assessment-plan.back-matter.resources",
            format!("no resource for assessment results {}", results.uuid),
        ));
    }
}

// ─── observation-pairing ────────────────────────────────────────────────────

fn check_observation_pairing(results: &AssessmentResults, errors: &mut Vec<ValidationError>) {
    for (r, result) in results.results.iter().enumerate() {
        let rp = format!("assessment-results.results[{}]", r);
        let mut uses: HashMap<Identifier, usize> =
            result.observations.iter().map(|o| (o.uuid, 0)).collect();

        for (f, finding) in result.findings.iter().enumerate() {
            let related = finding.related_observations.as_deref().unwrap_or_default();
            if related.len() != 1 {
                errors.push(error(
                    "observation-pairing",
                    format!("{}.findings[{}].related-observations", rp, f),
                    format!("expected exactly one related observation, found {}", related.len()),
                ));
            }
            for rel in related {
                match uses.get_mut(&rel.observation_uuid) {
                    Some(count) => *count += 1,
                    None => errors.push(error(
                        "observation-pairing",
                        format!("{}.findings[{}].related-observations", rp, f),
                        format!(
                            "observation {} is not part of this result",
                            rel.observation_uuid
                        ),
                    )),
                }
            }
        }

        for (o, observation) in result.observations.iter().enumerate() {
            let count = uses.get(&observation.uuid).copied().unwrap_or_default();
            if count != 1 {
                errors.push(error(
                    "observation-pairing",
                    format!("{}.observations[{}]", rp, o),
                    format!("referenced by {} findings, expected 1", count),
                ));
            }
        }
    }
}

// ─── exclusion-overlap ──────────────────────────────────────────────────────

fn check_exclusions(results: &AssessmentResults, errors: &mut Vec<ValidationError>) {
    for (r, result) in results.results.iter().enumerate() {
        let Some(excluded) = result.excluded_controls() else {
            continue;
        };
        let assessed: HashSet<&str> = result
            .findings
            .iter()
            .map(|f| f.target.target_id.as_str())
            .collect();
        for control in excluded.iter() {
            if assessed.contains(control.control_id.as_str()) {
                errors.push(error(
                    "exclusion-overlap",
                    format!("assessment-results.results[{}].reviewed-controls", r),
                    format!("{} is both excluded and assessed", control.control_id),
                ));
            }
        }
    }
}

// ─── token-string ───────────────────────────────────────────────────────────

fn check_string(path: String, value: &str, errors: &mut Vec<ValidationError>) {
    if !STRING_RE.is_match(value) {
        errors.push(error(
            "token-string",
            path,
            "must be non-empty, single-line, without surrounding whitespace",
        ));
    }
}

fn check_metadata_strings(prefix: &str, metadata: &Metadata, errors: &mut Vec<ValidationError>) {
    check_string(format!("{}.metadata.title", prefix), &metadata.title, errors);
    for (i, prop) in metadata.props.iter().flatten().enumerate() {
        check_string(format!("{}.metadata.props[{}].value", prefix, i), &prop.value, errors);
    }
    for (i, role) in metadata.roles.iter().flatten().enumerate() {
        check_string(format!("{}.metadata.roles[{}].title", prefix, i), &role.title, errors);
    }
}

fn check_strings(
    plan: &AssessmentPlan,
    results: &AssessmentResults,
    errors: &mut Vec<ValidationError>,
) {
    check_metadata_strings("assessment-plan", &plan.metadata, errors);
    check_metadata_strings("assessment-results", &results.metadata, errors);

    for (r, result) in results.results.iter().enumerate() {
        for (f, finding) in result.findings.iter().enumerate() {
            let fp = format!("assessment-results.results[{}].findings[{}]", r, f);
            check_string(format!("{}.target.target-id", fp), &finding.target.target_id, errors);
            for (p, prop) in finding.target.props.iter().flatten().enumerate() {
                check_string(format!("{}.target.props[{}].value", fp, p), &prop.value, errors);
            }
        }
    }
}

// ─── Warnings ───────────────────────────────────────────────────────────────

fn warn_empty_results(results: &AssessmentResults, warnings: &mut Vec<Diagnostic>) {
    for (r, result) in results.results.iter().enumerate() {
        if result.observations.is_empty() {
            warnings.push(Diagnostic {
                severity: DiagnosticSeverity::Warning,
                code: "empty-result".to_string(),
                path: Some(format!("assessment-results.results[{}]", r)),
                message: format!("{} has no assessed controls", result.title),
            });
        }
    }
}

fn warn_missing_locations(
    plan: &AssessmentPlan,
    results: &AssessmentResults,
    warnings: &mut Vec<Diagnostic>,
) {
    for (prefix, metadata) in [
        ("assessment-plan", &plan.metadata),
        ("assessment-results", &results.metadata),
    ] {
        if metadata.locations.as_ref().is_none_or(Vec::is_empty) {
            warnings.push(Diagnostic {
                severity: DiagnosticSeverity::Warning,
                code: "no-location".to_string(),
                path: Some(format!("{}.metadata.locations", prefix)),
                message: "tenant location is not recorded".to_string(),
            });
        }
    }
}
