#![no_main]

use libfuzzer_sys::fuzz_target;
use scuba_oscal::{ConversionOptions, LinkContext};

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let context = LinkContext {
        input_path: "ScubaResults.json".into(),
        output_dir: "out".into(),
    };
    // Anything that converts must also pass validation and render.
    if let Ok(converted) = scuba_oscal::convert(&s, &context, &ConversionOptions::default()) {
        assert!(scuba_oscal::validate(&converted.pair).is_valid());
        let json = scuba_oscal::serialize::to_json(&converted.pair.results_document()).unwrap();
        let _: serde_json::Value = serde_json::from_str(&json).unwrap();
    }
});
