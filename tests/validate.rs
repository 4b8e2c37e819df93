mod common;

use common::*;
use scuba_oscal::ids::{WellKnownSubject, new_id, well_known_id};
use scuba_oscal::validate::{validate, validate_documents};
use scuba_oscal::{DiagnosticSeverity, ValidationResult};

fn rules(result: &ValidationResult) -> Vec<&str> {
    result.errors.iter().map(|e| e.rule.as_str()).collect()
}

fn two_products() -> serde_json::Value {
    raw_results(&[
        (
            "Exchange Online",
            "EXO",
            vec![vec![
                control("MS.EXO.1.1v1", "Shall", "Pass"),
                control("MS.EXO.2.1v1", "Not-Implemented", "N/A"),
            ]],
        ),
        (
            "Azure Active Directory",
            "AAD",
            vec![
                vec![control("MS.AAD.1.1v1", "Shall", "Fail")],
                vec![control("MS.AAD.2.1v1", "Should", "Pass")],
            ],
        ),
    ])
}

#[test]
fn converted_pair_is_valid() {
    let converted = convert(&two_products());
    let result = validate(&converted.pair);
    assert!(result.is_valid(), "{:?}", result.errors);
    assert!(result.warnings.is_empty());
}

#[test]
fn reused_identifier_is_reported_with_both_paths() {
    let mut pair = convert(&exo_scenario()).pair;
    let reused = pair.results.results[0].observations[0].uuid;
    pair.results.results[0].findings[0].uuid = reused;

    let result = validate(&pair);
    let dup = result
        .errors
        .iter()
        .find(|e| e.rule == "duplicate-uuid")
        .expect("duplicate reported");
    assert_eq!(dup.path, "assessment-results.results[0].findings[0]");
    assert!(dup.message.contains("assessment-results.results[0].observations[0]"));
}

#[test]
fn sibling_ids_in_back_matter_are_not_duplicates() {
    let pair = convert(&exo_scenario()).pair;
    let plan_resources = &pair.plan.back_matter.as_ref().unwrap().resources;
    assert!(plan_resources.iter().any(|r| r.uuid == pair.results.uuid));
    assert!(!rules(&validate(&pair)).contains(&"duplicate-uuid"));
}

#[test]
fn well_known_id_outside_components_is_rejected() {
    let mut pair = convert(&exo_scenario()).pair;
    pair.results.results[0].uuid = well_known_id(WellKnownSubject::ScriptingEngine);
    let result = validate(&pair);
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.rule == "duplicate-uuid" && e.path == "assessment-results.results[0]")
    );
}

#[test]
fn dangling_import_is_reported() {
    let mut pair = convert(&exo_scenario()).pair;
    pair.plan.import_ssp.href = format!("#{}", new_id());
    let result = validate(&pair);
    assert_eq!(rules(&result), vec!["import-href"]);
    assert_eq!(result.errors[0].path, "assessment-plan.import-ssp.href");
}

#[test]
fn import_without_fragment_is_reported() {
    let mut pair = convert(&exo_scenario()).pair;
    pair.results.import_ap.href = "sap.json".to_string();
    let report = validate(&pair);
    let found = rules(&report);
    assert!(found.contains(&"import-href"));
    assert!(found.contains(&"sibling-reference"));
}

#[test]
fn results_must_import_their_own_plan() {
    let first = convert(&exo_scenario()).pair;
    let second = convert(&exo_scenario()).pair;
    let result = validate_documents(&first.plan, &second.results);
    assert!(rules(&result).contains(&"sibling-reference"));
}

#[test]
fn finding_without_observation_is_reported() {
    let mut pair = convert(&exo_scenario()).pair;
    pair.results.results[0].findings[0].related_observations = None;
    let result = validate(&pair);
    let pairing: Vec<&str> = result
        .errors
        .iter()
        .filter(|e| e.rule == "observation-pairing")
        .map(|e| e.path.as_str())
        .collect();
    assert_eq!(
        pairing,
        vec![
            "assessment-results.results[0].findings[0].related-observations",
            "assessment-results.results[0].observations[0]",
        ]
    );
}

#[test]
fn observation_shared_by_two_findings_is_reported() {
    let mut pair = convert(&two_products()).pair;
    let result = &mut pair.results.results[1];
    let shared = result.findings[0].related_observations.clone();
    result.findings[1].related_observations = shared;
    let errors = validate(&pair).errors;
    assert!(errors.iter().any(|e| e.rule == "observation-pairing"
        && e.path == "assessment-results.results[1].observations[0]"
        && e.message.contains("referenced by 2")));
    assert!(errors.iter().any(|e| e.rule == "observation-pairing"
        && e.path == "assessment-results.results[1].observations[1]"));
}

#[test]
fn observation_from_another_result_is_reported() {
    let mut pair = convert(&two_products()).pair;
    let foreign = pair.results.results[1].findings[0].related_observations.clone();
    pair.results.results[0].findings[0].related_observations = foreign;
    assert!(validate(&pair).errors.iter().any(|e| e
        .message
        .contains("is not part of this result")));
}

#[test]
fn excluded_and_assessed_control_is_reported() {
    let mut pair = convert(&exo_scenario()).pair;
    pair.results.results[0].findings[0].target.target_id = "MS.EXO.2.1v1".to_string();
    let result = validate(&pair);
    assert_eq!(rules(&result), vec!["exclusion-overlap"]);
}

#[test]
fn wrong_oscal_version_is_reported_per_document() {
    let mut pair = convert(&exo_scenario()).pair;
    pair.plan.metadata.oscal_version = "1.0.4".to_string();
    pair.results.metadata.oscal_version = "1.0.4".to_string();
    let result = validate(&pair);
    assert_eq!(rules(&result), vec!["oscal-version", "oscal-version"]);
}

#[test]
fn padded_strings_are_reported() {
    let mut pair = convert(&exo_scenario()).pair;
    pair.results.metadata.title = " Contoso ".to_string();
    pair.results.results[0].findings[0].target.target_id = String::new();
    let paths: Vec<String> = validate(&pair)
        .errors
        .into_iter()
        .filter(|e| e.rule == "token-string")
        .map(|e| e.path)
        .collect();
    assert!(paths.contains(&"assessment-results.metadata.title".to_string()));
    assert!(paths.contains(&"assessment-results.results[0].findings[0].target.target-id".to_string()));
}

#[test]
fn every_error_is_collected() {
    let mut pair = convert(&exo_scenario()).pair;
    pair.plan.metadata.oscal_version = "1.0.0".to_string();
    pair.plan.import_ssp.href = "#missing".to_string();
    pair.results.results[0].findings[0].related_observations = None;
    let report = validate(&pair);
    let found = rules(&report);
    assert!(found.contains(&"oscal-version"));
    assert!(found.contains(&"import-href"));
    assert!(found.contains(&"observation-pairing"));
}

#[test]
fn product_with_only_excluded_controls_warns() {
    let value = raw_results(&[(
        "Exchange Online",
        "EXO",
        vec![vec![control("MS.EXO.2.1v1", "Not-Implemented", "N/A")]],
    )]);
    let converted = convert(&value);
    assert_eq!(converted.warnings.len(), 1);
    let warning = &converted.warnings[0];
    assert_eq!(warning.code, "empty-result");
    assert_eq!(warning.severity, DiagnosticSeverity::Warning);
    assert_eq!(warning.path.as_deref(), Some("assessment-results.results[0]"));
}

#[test]
fn missing_location_warns() {
    let mut pair = convert(&exo_scenario()).pair;
    pair.plan.metadata.locations = None;
    let result = validate(&pair);
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, "no-location");
}

#[test]
fn validation_error_summarizes_first_rule() {
    let mut pair = convert(&exo_scenario()).pair;
    pair.plan.metadata.oscal_version = "1.0.4".to_string();
    pair.results.metadata.oscal_version = "1.0.4".to_string();
    let err = scuba_oscal::ConvertError::Validation(validate(&pair).errors);
    assert_eq!(
        err.to_string(),
        "assembled documents failed validation: oscal-version at \
         assessment-plan.metadata.oscal-version: expected 1.1.2, found 1.0.4 (and 1 more)"
    );
}
