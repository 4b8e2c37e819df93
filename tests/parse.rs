mod common;

use common::*;
use scuba_oscal::error::ConvertError;
use scuba_oscal::parse::{parse, parse_file};

fn missing_path(err: ConvertError) -> String {
    match err {
        ConvertError::MissingField { path } => path,
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[test]
fn parses_fixture() {
    let raw = parse(&exo_scenario().to_string()).expect("parse should succeed");
    assert_eq!(raw.metadata.display_name, "Contoso");
    assert_eq!(raw.metadata.products_assessed, vec!["Exchange Online"]);
    assert_eq!(raw.results["EXO"][0].controls.len(), 2);
    assert_eq!(raw.raw.tenant_details.len(), 1);
}

#[test]
fn accepts_byte_order_mark() {
    let input = format!("\u{feff}{}", exo_scenario());
    let raw = parse(&input).expect("BOM-prefixed input should parse");
    assert_eq!(raw.metadata.tool, "ScubaGear");
}

#[test]
fn rejects_empty_input() {
    let err = parse("  \n").unwrap_err();
    assert!(matches!(err, ConvertError::InputParse { .. }), "got {:?}", err);
}

#[test]
fn rejects_malformed_json() {
    let err = parse("{\"MetaData\": ").unwrap_err();
    match err {
        ConvertError::InputParse { source, .. } => assert!(source.is_some()),
        other => panic!("expected InputParse, got {:?}", other),
    }
}

#[test]
fn rejects_non_object_root() {
    let err = parse("[1, 2, 3]").unwrap_err();
    assert!(matches!(err, ConvertError::InputParse { .. }));
}

#[test]
fn names_missing_top_level_section() {
    let mut value = exo_scenario();
    value.as_object_mut().unwrap().remove("Raw");
    assert_eq!(missing_path(parse(&value.to_string()).unwrap_err()), "Raw");
}

#[test]
fn names_missing_metadata_field() {
    let mut value = exo_scenario();
    value["MetaData"].as_object_mut().unwrap().remove("TimestampZulu");
    assert_eq!(
        missing_path(parse(&value.to_string()).unwrap_err()),
        "MetaData.TimestampZulu"
    );
}

#[test]
fn names_missing_tenant_address_field() {
    let mut value = exo_scenario();
    value["Raw"]["tenant_details"][0]["AADAdditionalData"]
        .as_object_mut()
        .unwrap()
        .remove("PostalCode");
    assert_eq!(
        missing_path(parse(&value.to_string()).unwrap_err()),
        "Raw.tenant_details[0].AADAdditionalData.PostalCode"
    );
}

#[test]
fn null_address_members_are_accepted() {
    let mut value = exo_scenario();
    value["Raw"]["tenant_details"][0]["AADAdditionalData"]["Street"] = serde_json::Value::Null;
    let raw = parse(&value.to_string()).expect("null street should parse");
    assert!(raw.raw.tenant_details[0].aad_additional_data.street.is_none());
}

#[test]
fn names_group_without_controls() {
    let mut value = exo_scenario();
    value["Results"]["EXO"][0].as_object_mut().unwrap().remove("Controls");
    assert_eq!(
        missing_path(parse(&value.to_string()).unwrap_err()),
        "Results.EXO[0].Controls"
    );
}

#[test]
fn malformed_control_names_path_and_field() {
    let mut value = exo_scenario();
    value["Results"]["EXO"][0]["Controls"][1]
        .as_object_mut()
        .unwrap()
        .remove("Requirement");
    match parse(&value.to_string()).unwrap_err() {
        ConvertError::MalformedControl { path, field } => {
            assert_eq!(path, "Results.EXO[0].Controls[1]");
            assert_eq!(field, "Requirement");
        }
        other => panic!("expected MalformedControl, got {:?}", other),
    }
}

#[test]
fn non_string_control_field_is_malformed() {
    let mut value = exo_scenario();
    value["Results"]["EXO"][0]["Controls"][0]["Result"] = serde_json::json!(true);
    let err = parse(&value.to_string()).unwrap_err();
    assert!(matches!(err, ConvertError::MalformedControl { .. }), "got {:?}", err);
}

#[test]
fn unknown_members_are_ignored() {
    let mut value = exo_scenario();
    value["MetaData"]["ReportUUID"] = serde_json::json!("abc");
    value["Results"]["EXO"][0]["Controls"][0]["OmittedEvaluationResult"] = serde_json::json!("N/A");
    assert!(parse(&value.to_string()).is_ok());
}

#[test]
fn parse_file_reports_io_errors_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    match parse_file(&missing).unwrap_err() {
        ConvertError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("expected Io, got {:?}", other),
    }
}

#[test]
fn parse_file_reads_bom_prefixed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ScubaResults.json");
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(exo_scenario().to_string().as_bytes());
    std::fs::write(&path, bytes).unwrap();
    assert!(parse_file(&path).is_ok());
}
