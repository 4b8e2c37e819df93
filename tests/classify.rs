use scuba_oscal::classify::{ControlClass, NOT_IMPLEMENTED, classify, classify_criticality};
use scuba_oscal::normalize::{normalize_or, normalize_requirement};
use scuba_oscal::raw::Control;

fn control(criticality: &str) -> Control {
    Control {
        control_id: "MS.AAD.1.1v1".to_string(),
        criticality: criticality.to_string(),
        details: "details".to_string(),
        requirement: "requirement".to_string(),
        result: "Pass".to_string(),
    }
}

#[test]
fn not_implemented_is_excluded() {
    assert_eq!(classify(&control(NOT_IMPLEMENTED)), ControlClass::Excluded);
}

#[test]
fn should_and_shall_are_included() {
    assert_eq!(classify(&control("Should")), ControlClass::Included);
    assert_eq!(classify(&control("Shall")), ControlClass::Included);
}

#[test]
fn composite_tags_match_by_substring() {
    assert_eq!(classify_criticality("Shall/Not-Implemented"), ControlClass::Excluded);
    assert_eq!(classify_criticality("Should/3rd Party"), ControlClass::Included);
}

#[test]
fn matching_is_case_sensitive_and_untrimmed() {
    assert_eq!(classify_criticality("not-implemented"), ControlClass::Included);
    assert_eq!(classify_criticality("Not Implemented"), ControlClass::Included);
    assert_eq!(classify_criticality("  Not-Implemented  "), ControlClass::Excluded);
}

#[test]
fn empty_criticality_is_included() {
    assert_eq!(classify_criticality(""), ControlClass::Included);
}

#[test]
fn requirement_newlines_collapse_and_edges_trim() {
    assert_eq!(normalize_requirement("a.\nb.\n  "), "a. b.");
}

#[test]
fn requirement_carriage_returns_collapse() {
    assert_eq!(normalize_requirement("\r\nfirst\r\nsecond\r"), "first second");
}

#[test]
fn requirement_without_whitespace_is_unchanged() {
    let text = "Legacy authentication SHALL be blocked.";
    assert_eq!(normalize_requirement(text), text);
}

#[test]
fn real_requirement_with_markup_normalizes() {
    let text = "At a minimum, the following alerts SHALL be enabled:\na. <b>Suspicious email sending patterns detected.</b>\nb. <b>Suspicious Connector Activity.</b>\n<!--Policy: MS.EXO.16.1v1; Criticality: SHALL -->";
    let normalized = normalize_requirement(text);
    assert!(!normalized.contains('\n'));
    assert!(normalized.starts_with("At a minimum"));
    assert!(normalized.ends_with("-->"));
    assert!(normalized.contains("enabled: a. <b>Suspicious"));
}

#[test]
fn blank_requirement_falls_back() {
    assert_eq!(normalize_or(" \n ", "fallback"), "fallback");
    assert_eq!(normalize_or(" text\n", "fallback"), "text");
}
