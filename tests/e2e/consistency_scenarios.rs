//! E2E Scenario: registry and descriptor consistency
//!
//! Covers the canonical outcomes of a `roster check` run:
//! - a complete baseline project is consistent
//! - a registry entry without a descriptor
//! - two descriptors declaring the same id
//! - a descriptor with a blank required field
//! - a descriptor without a registry entry
//! - repeated runs produce the same violations
//! - shell syntax in a descriptor is rejected, never executed

use roster::test_utils::fixtures::descriptor_source;

use super::fixture::E2EFixture;

const BASELINE: [&str; 4] = ["ios", "android", "firebase", "academy"];

#[test]
fn test_baseline_project_is_consistent() {
    let mut fixture = E2EFixture::consistent("baseline_consistent", &BASELINE);

    fixture.log_step("Run check in human mode");
    let output = fixture.run_roster(&["check"]);
    fixture.assert_success(&output, "human check");
    fixture.assert_output_contains(&output, "CONSISTENT");

    fixture.log_step("Run check in robot mode");
    let output = fixture.run_robot_check(&[]);
    fixture.assert_success(&output, "robot check");
    let json = output.json();
    assert_eq!(json["verdict"], "CONSISTENT");
    assert!(json["violations"].as_array().unwrap().is_empty());
    assert_eq!(json["summary"]["passed"], 16);
}

#[test]
fn test_registry_entry_without_descriptor() {
    let mut fixture = E2EFixture::consistent("ghost_entry", &["ios"]);
    fixture.project.write_registry_ids(&["ios", "ghost"]);
    fixture.project.write_config("[baseline]\nrequired = [\"ios\"]\n");

    fixture.log_step("Check a registry that lists a team with no descriptor");
    let output = fixture.run_robot_check(&[]);
    fixture.assert_failure(&output, "ghost entry");

    let referential = output.violations_of_kind("ReferentialError");
    assert_eq!(referential.len(), 1);
    assert!(referential[0]["message"].as_str().unwrap().contains("'ghost'"));
    assert_eq!(referential[0]["check_id"], "registry-descriptor-coverage");
    assert_eq!(output.json()["violations"].as_array().unwrap().len(), 1);
}

#[test]
fn test_duplicate_descriptor_ids() {
    let mut fixture = E2EFixture::consistent("duplicate_ids", &BASELINE);
    fixture.project.write_descriptor_file(
        "ios-copy.conf",
        &descriptor_source("ios", "iOS again", "Copied descriptor", &["lead"]),
    );

    fixture.log_step("Check two descriptors declaring TEAM_ID=ios");
    let output = fixture.run_robot_check(&[]);
    fixture.assert_failure(&output, "duplicate ids");

    let duplicates = output.violations_of_kind("DuplicateError");
    assert_eq!(duplicates.len(), 1);
    let message = duplicates[0]["message"].as_str().unwrap();
    assert!(message.contains("ios.conf"));
    assert!(message.contains("ios-copy.conf"));
}

#[test]
fn test_blank_team_name() {
    let mut fixture = E2EFixture::consistent("blank_name", &BASELINE);
    fixture
        .project
        .write_descriptor("android", "", "Owns the android surface", &["lead"]);

    fixture.log_step("Check a descriptor with an empty TEAM_NAME");
    let output = fixture.run_robot_check(&[]);
    fixture.assert_failure(&output, "blank name");

    let json = output.json();
    let violations = json["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["kind"], "SchemaError");
    assert_eq!(violations[0]["field"], "TEAM_NAME");
    assert_eq!(violations[0]["file"], "teams/android.conf");

    let failed: Vec<_> = json["checks"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|check| check["status"] != "pass")
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["id"], "descriptor-required-fields");
}

#[test]
fn test_descriptor_without_registry_entry() {
    let mut fixture = E2EFixture::consistent(
        "orphan_descriptor",
        &["ios", "android", "firebase", "academy", "web"],
    );
    fixture.project.write_registry_ids(&BASELINE);

    fixture.log_step("Check after removing the registry entry for web");
    let output = fixture.run_robot_check(&[]);
    fixture.assert_failure(&output, "orphan descriptor");

    let json = output.json();
    let violations = json["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["kind"], "ReferentialError");
    assert!(
        violations[0]["message"]
            .as_str()
            .unwrap()
            .starts_with("descriptor has no registry entry")
    );
}

#[test]
fn test_repeated_runs_are_identical() {
    let mut fixture = E2EFixture::consistent("idempotence", &BASELINE);
    fixture.project.write_registry_ids(&["ios", "android", "ghost"]);
    fixture.project.write_descriptor("Web", "Web", "", &[]);

    fixture.log_step("First run");
    let first = fixture.run_robot_check(&[]);
    fixture.log_step("Second run");
    let second = fixture.run_robot_check(&[]);

    fixture.assert_failure(&first, "first run");
    assert_eq!(first.json()["violations"], second.json()["violations"]);
    assert_eq!(first.json()["checks"], second.json()["checks"]);
}

#[test]
fn test_shell_syntax_is_not_executed() {
    let mut fixture = E2EFixture::consistent("no_execution", &BASELINE);
    fixture.project.write_descriptor_file(
        "evil.conf",
        "TEAM_ID=evil\nTEAM_NAME=$(touch pwned)\nTEAM_DESCRIPTION=\"x\"\nTEAM_AGENTS=(lead)\n",
    );

    fixture.log_step("Check a descriptor containing command substitution");
    let output = fixture.run_robot_check(&[]);
    fixture.assert_failure(&output, "command substitution");

    let format_errors = output.violations_of_kind("FormatError");
    assert_eq!(format_errors.len(), 1);
    assert_eq!(format_errors[0]["file"], "teams/evil.conf");
    assert_eq!(format_errors[0]["line"], 2);
    assert!(!fixture.root().join("pwned").exists());
    assert!(!fixture.root().join("teams/pwned").exists());
}
