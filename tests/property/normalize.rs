use proptest::prelude::*;
use scuba_oscal::classify::{ControlClass, NOT_IMPLEMENTED, classify_criticality};
use scuba_oscal::normalize::normalize_requirement;

/// Requirement-like text with embedded line breaks of every flavor.
fn arb_requirement() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[A-Za-z0-9 .,:<>/!-]{0,20}",
            Just("\n".to_string()),
            Just("\r\n".to_string()),
            Just("\r".to_string()),
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn normalized_text_is_single_line(text in arb_requirement()) {
        let out = normalize_requirement(&text);
        prop_assert!(!out.contains('\n'));
        prop_assert!(!out.contains('\r'));
    }

    #[test]
    fn normalized_text_has_no_surrounding_whitespace(text in arb_requirement()) {
        let out = normalize_requirement(&text);
        prop_assert_eq!(out.trim(), out.as_str());
    }

    #[test]
    fn normalization_is_idempotent(text in arb_requirement()) {
        let once = normalize_requirement(&text);
        prop_assert_eq!(normalize_requirement(&once), once.clone());
    }

    #[test]
    fn text_without_line_breaks_only_trims(text in "[A-Za-z .]{0,40}") {
        prop_assert_eq!(normalize_requirement(&text), text.trim());
    }

    #[test]
    fn tag_anywhere_excludes(prefix in "[A-Za-z /]{0,10}", suffix in "[A-Za-z /]{0,10}") {
        let criticality = format!("{}{}{}", prefix, NOT_IMPLEMENTED, suffix);
        prop_assert_eq!(classify_criticality(&criticality), ControlClass::Excluded);
    }

    #[test]
    fn criticality_without_tag_includes(criticality in "[A-Za-z /]{0,30}") {
        prop_assume!(!criticality.contains(NOT_IMPLEMENTED));
        prop_assert_eq!(classify_criticality(&criticality), ControlClass::Included);
    }
}
