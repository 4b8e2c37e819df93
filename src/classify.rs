//! Control classification.

use crate::raw::Control;

/// Criticality marker for policies the tool cannot check.
pub const NOT_IMPLEMENTED: &str = "Not-Implemented";

/// Whether a control contributes an observation/finding pair or an exclusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlClass {
    Included,
    Excluded,
}

/// Classify a control by its criticality tag.
///
/// Criticality can carry composite tags (`"Shall/Not-Implemented"`), so this
/// is a case-sensitive substring test on the raw value, with no trimming.
pub fn classify(control: &Control) -> ControlClass {
    classify_criticality(&control.criticality)
}

pub fn classify_criticality(criticality: &str) -> ControlClass {
    if criticality.contains(NOT_IMPLEMENTED) {
        ControlClass::Excluded
    } else {
        ControlClass::Included
    }
}
