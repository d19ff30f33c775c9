//! E2E Scenario: runs that cannot evaluate every check
//!
//! - registry parsing disabled: registry checks skip and the run is degraded
//! - strict mode turns a degraded run into a failure
//! - a missing registry fails structurally without degrading the run
//! - a malformed registry reports the offending line

use super::fixture::E2EFixture;

const BASELINE: [&str; 4] = ["ios", "android", "firebase", "academy"];

#[test]
fn test_parser_unavailable_is_degraded() {
    let mut fixture = E2EFixture::consistent("parser_none", &BASELINE);

    fixture.log_step("Run with the registry parser disabled");
    let output = fixture.run_robot_check(&["--registry-parser", "none"]);
    fixture.assert_success(&output, "degraded run");

    let json = output.json();
    assert_eq!(json["verdict"], "DEGRADED");
    assert_eq!(json["degraded"], true);
    let parses = json["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|check| check["id"] == "registry-parses")
        .unwrap();
    assert_eq!(parses["status"], "skipped");
    assert_eq!(parses["skip"]["reason"], "parser-unavailable");

    fixture.log_step("Human output names the degraded verdict");
    let output = fixture.run_roster(&["check", "--registry-parser", "none"]);
    fixture.assert_success(&output, "degraded human run");
    fixture.assert_output_contains(&output, "SKIP registry-parses");
    fixture.assert_output_contains(&output, "DEGRADED");
}

#[test]
fn test_parser_disabled_from_config() {
    let mut fixture = E2EFixture::consistent("parser_config", &BASELINE);
    fixture.project.write_config("[registry]\nparser = \"none\"\n");

    fixture.log_step("Run with parser = none in roster.toml");
    let output = fixture.run_robot_check(&[]);
    fixture.assert_success(&output, "config degraded run");
    assert_eq!(output.json()["inputs"]["parser"], "none");
    assert_eq!(output.json()["verdict"], "DEGRADED");
}

#[test]
fn test_strict_fails_degraded_run() {
    let mut fixture = E2EFixture::consistent("parser_none_strict", &BASELINE);

    fixture.log_step("Run degraded in strict mode");
    let output = fixture.run_robot_check(&["--registry-parser", "none", "--strict"]);
    fixture.assert_failure(&output, "strict degraded run");
    assert_eq!(output.json()["verdict"], "INCONSISTENT");
    assert!(output.json()["violations"].as_array().unwrap().is_empty());
}

#[test]
fn test_missing_registry() {
    let mut fixture = E2EFixture::new("missing_registry");
    fixture.project.write_team("ios");

    fixture.log_step("Run without a registry file");
    let output = fixture.run_robot_check(&["--baseline", ""]);
    fixture.assert_failure(&output, "missing registry");

    let json = output.json();
    assert_eq!(json["degraded"], false);
    let structural = output.violations_of_kind("StructuralError");
    assert_eq!(structural.len(), 1);
    assert_eq!(structural[0]["check_id"], "registry-exists");

    let parses = json["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|check| check["id"] == "registry-parses")
        .unwrap();
    assert_eq!(parses["skip"]["reason"], "missing-input");
}

#[test]
fn test_malformed_registry() {
    let mut fixture = E2EFixture::consistent("malformed_registry", &BASELINE);
    fixture
        .project
        .write_registry("{\n  \"version\": \"1.0\",\n  \"teams\": [\n    {\"id\": \"ios\",}\n  ]\n}\n");

    fixture.log_step("Run against a registry with a trailing comma");
    let output = fixture.run_robot_check(&[]);
    fixture.assert_failure(&output, "malformed registry");

    let format_errors = output.violations_of_kind("FormatError");
    assert_eq!(format_errors.len(), 1);
    assert_eq!(format_errors[0]["check_id"], "registry-parses");
    assert_eq!(format_errors[0]["line"], 4);
}
