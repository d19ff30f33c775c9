//! E2E Scenario: project configuration
//!
//! - `roster.toml` is discovered from a nested working directory
//! - custom paths and descriptor extensions
//! - disabled checks and severity overrides
//! - `--only` restricts the run
//! - invalid configuration is reported as an error

use roster::test_utils::fixtures::descriptor_source;

use super::fixture::E2EFixture;

const BASELINE: [&str; 4] = ["ios", "android", "firebase", "academy"];

#[test]
fn test_config_discovered_from_subdirectory() {
    let mut fixture = E2EFixture::new("nested_discovery");
    fixture.project.write_config(
        r#"
[paths]
registry = "org/registry.json"
descriptors = "org/teams"
descriptor_extension = "team"

[baseline]
required = ["ios"]
"#,
    );
    fixture.project.write_file(
        "org/registry.json",
        r#"{"version": "2", "teams": [{"id": "ios"}, {"id": "web"}]}"#,
    );
    fixture.project.write_file(
        "org/teams/ios.team",
        &descriptor_source("ios", "iOS", "Native apps", &["lead"]),
    );
    fixture.project.write_file(
        "org/teams/web.team",
        &descriptor_source("web", "Web", "Browser apps", &["lead", "qa"]),
    );
    let nested = fixture.project.write_file("src/app/.keep", "");
    let nested = nested.parent().unwrap().to_path_buf();

    fixture.log_step("Run from a nested directory");
    let output = fixture.run_roster_in(&nested, &["--robot", "--quiet"]);
    fixture.assert_success(&output, "nested run");

    let json = output.json();
    assert_eq!(json["verdict"], "CONSISTENT");
    assert_eq!(json["inputs"]["registry"], "org/registry.json");
    assert_eq!(json["inputs"]["extension"], "team");
    assert_eq!(json["inputs"]["config"], "roster.toml");
}

#[test]
fn test_disabled_checks() {
    let mut fixture = E2EFixture::consistent("disabled_checks", &["ios"]);
    fixture
        .project
        .write_config("[checks]\ndisabled = [\"baseline-teams\"]\n");

    fixture.log_step("Run without the baseline check");
    let output = fixture.run_robot_check(&[]);
    fixture.assert_success(&output, "baseline disabled");

    let json = output.json();
    let baseline = json["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|check| check["id"] == "baseline-teams")
        .unwrap();
    assert_eq!(baseline["status"], "skipped");
    assert_eq!(baseline["skip"]["reason"], "disabled");
    assert_eq!(json["verdict"], "CONSISTENT");
}

#[test]
fn test_severity_override_downgrades_check() {
    let mut fixture = E2EFixture::consistent("severity_override", &BASELINE);
    fixture.project.write_team("web");
    fixture.project.write_config(
        "[checks.severity]\ndescriptor-registry-coverage = \"warning\"\n",
    );

    fixture.log_step("Orphan descriptor reported as a warning");
    let output = fixture.run_robot_check(&[]);
    fixture.assert_success(&output, "downgraded orphan");
    let json = output.json();
    assert_eq!(json["summary"]["warnings"], 1);
    assert_eq!(json["summary"]["errors"], 0);

    fixture.log_step("Strict mode turns the warning back into a failure");
    let output = fixture.run_robot_check(&["--strict"]);
    fixture.assert_failure(&output, "strict orphan");
    assert_eq!(output.json()["summary"]["errors"], 1);
}

#[test]
fn test_only_restricts_run() {
    let mut fixture = E2EFixture::consistent("only_checks", &["ios"]);
    fixture.project.write_registry_ids(&["ios", "ghost"]);

    fixture.log_step("Run structural checks only");
    let output = fixture.run_robot_check(&["--only", "registry-exists,descriptor-dir-exists"]);
    fixture.assert_success(&output, "only structural");

    let json = output.json();
    assert_eq!(json["summary"]["passed"], 2);
    assert_eq!(json["summary"]["skipped"], 14);
}

#[test]
fn test_invalid_config_is_an_error() {
    let mut fixture = E2EFixture::consistent("invalid_config", &BASELINE);
    fixture.project.write_config("[paths]\nregistyr = \"teams.json\"\n");

    fixture.log_step("Run with a misspelled config key");
    let output = fixture.run_roster(&["--robot", "--quiet", "check"]);
    fixture.assert_failure(&output, "invalid config");

    let json = output.json();
    assert_eq!(json["error"], true);
    assert_eq!(json["code"], "config_error");
}
