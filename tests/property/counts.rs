use proptest::prelude::*;
use scuba_oscal::enums::ObjectiveState;
use scuba_oscal::{ConversionOptions, LinkContext};
use serde_json::{Value, json};
use std::collections::HashSet;

#[derive(Clone, Debug)]
struct Ctrl {
    criticality: &'static str,
    result: &'static str,
}

fn arb_control() -> impl Strategy<Value = Ctrl> {
    (
        prop_oneof![
            Just("Shall"),
            Just("Should"),
            Just("Shall/3rd Party"),
            Just("Not-Implemented"),
            Just("Should/Not-Implemented"),
        ],
        prop_oneof![Just("Pass"), Just("Fail"), Just("Warning"), Just("N/A")],
    )
        .prop_map(|(criticality, result)| Ctrl {
            criticality,
            result,
        })
}

/// Products, each a list of groups, each a list of controls.
fn arb_products() -> impl Strategy<Value = Vec<Vec<Vec<Ctrl>>>> {
    prop::collection::vec(
        prop::collection::vec(prop::collection::vec(arb_control(), 0..5), 0..4),
        1..4,
    )
}

fn document(products: &[Vec<Vec<Ctrl>>]) -> Value {
    let mut assessed = Vec::new();
    let mut mapping = serde_json::Map::new();
    let mut results = serde_json::Map::new();
    for (p, groups) in products.iter().enumerate() {
        let name = format!("Product {}", p);
        let abbr = format!("P{}", p);
        let groups: Vec<Value> = groups
            .iter()
            .enumerate()
            .map(|(g, controls)| {
                let controls: Vec<Value> = controls
                    .iter()
                    .enumerate()
                    .map(|(c, ctrl)| {
                        json!({
                            "Control ID": format!("MS.{}.{}.{}v1", abbr, g + 1, c + 1),
                            "Criticality": ctrl.criticality,
                            "Result": ctrl.result,
                            "Details": "details",
                            "Requirement": "line one\nline two\n",
                        })
                    })
                    .collect();
                json!({ "Controls": controls })
            })
            .collect();
        assessed.push(name.clone());
        mapping.insert(name, json!(abbr));
        results.insert(abbr, Value::Array(groups));
    }
    json!({
        "MetaData": {
            "DisplayName": "Contoso",
            "TenantId": "t-1",
            "DomainName": "contoso.com",
            "Tool": "ScubaGear",
            "ToolVersion": "1.3.0",
            "TimestampZulu": "2024-05-01T12:00:00.000Z",
            "ProductsAssessed": assessed,
            "ProductAbbreviationMapping": mapping,
            "AgencyName": "Agency",
            "SubAgencyName": "Office"
        },
        "Results": results,
        "Raw": {"tenant_details": [{
            "DisplayName": "Contoso",
            "AADAdditionalData": {"Street": null, "City": null, "State": null,
                                  "CountryLetterCode": null, "PostalCode": null}
        }]}
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn findings_and_exclusions_partition_controls(products in arb_products()) {
        let context = LinkContext {
            input_path: "ScubaResults.json".into(),
            output_dir: "out".into(),
        };
        let converted = scuba_oscal::convert(
            &document(&products).to_string(),
            &context,
            &ConversionOptions::default(),
        )
        .unwrap();
        let results = &converted.pair.results.results;
        prop_assert_eq!(results.len(), products.len());

        let mut ids = HashSet::new();
        for (groups, result) in products.iter().zip(results) {
            let all: Vec<&Ctrl> = groups.iter().flatten().collect();
            let excluded = all
                .iter()
                .filter(|c| c.criticality.contains("Not-Implemented"))
                .count();
            let passed = all
                .iter()
                .filter(|c| !c.criticality.contains("Not-Implemented") && c.result == "Pass")
                .count();

            prop_assert_eq!(result.findings.len(), all.len() - excluded);
            prop_assert_eq!(result.observations.len(), result.findings.len());
            prop_assert_eq!(
                result.excluded_controls().map_or(0, |e| e.len()),
                excluded
            );
            prop_assert_eq!(
                result
                    .findings
                    .iter()
                    .filter(|f| f.target.status.state == ObjectiveState::Satisfied)
                    .count(),
                passed
            );

            for finding in &result.findings {
                prop_assert!(ids.insert(finding.uuid));
            }
            for observation in &result.observations {
                prop_assert!(ids.insert(observation.uuid));
            }
        }
    }
}
