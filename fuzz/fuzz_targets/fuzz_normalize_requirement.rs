#![no_main]

use libfuzzer_sys::fuzz_target;
use scuba_oscal::normalize::normalize_requirement;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let once = normalize_requirement(&s);
    assert!(!once.contains('\n') && !once.contains('\r'));
    assert_eq!(normalize_requirement(&once), once);
});
