//! Scenario fixture: a throwaway project plus a logged `roster` runner.

use std::path::Path;

use roster::test_utils::fixtures::TeamFixture;
use serde_json::Value;

use super::common::roster_cmd;

/// Captured result of one `roster` invocation.
#[derive(Debug)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Parse stdout as a JSON document.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|err| panic!("stdout is not JSON ({err}):\n{}", self.stdout))
    }

    /// Violations from a JSON report, filtered by kind.
    pub fn violations_of_kind(&self, kind: &str) -> Vec<Value> {
        self.json()["violations"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|violation| violation["kind"] == kind)
            .collect()
    }
}

pub struct E2EFixture {
    pub scenario: String,
    pub project: TeamFixture,
    step: usize,
}

impl E2EFixture {
    /// Empty project with a `teams/` directory.
    pub fn new(scenario: &str) -> Self {
        println!("[E2E] scenario: {scenario}");
        Self {
            scenario: scenario.to_string(),
            project: TeamFixture::new(),
            step: 0,
        }
    }

    /// Project whose registry and descriptors agree on `ids`.
    pub fn consistent(scenario: &str, ids: &[&str]) -> Self {
        println!("[E2E] scenario: {scenario}");
        Self {
            scenario: scenario.to_string(),
            project: TeamFixture::consistent(ids),
            step: 0,
        }
    }

    pub fn root(&self) -> &Path {
        self.project.root()
    }

    pub fn log_step(&mut self, description: &str) {
        self.step += 1;
        println!("[STEP {}] {}: {description}", self.step, self.scenario);
    }

    /// Run `roster` from the project root.
    pub fn run_roster(&self, args: &[&str]) -> CommandOutput {
        self.run_roster_in(self.root(), args)
    }

    /// Run `roster` from `dir`.
    pub fn run_roster_in(&self, dir: &Path, args: &[&str]) -> CommandOutput {
        println!("[CMD] roster {}", args.join(" "));
        let output = roster_cmd(dir)
            .args(args)
            .output()
            .expect("failed to run roster");
        let result = CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        println!("[EXIT] {:?}", result.exit_code);
        result
    }

    /// Run `roster --robot --quiet check` with extra arguments.
    pub fn run_robot_check(&self, args: &[&str]) -> CommandOutput {
        let mut full = vec!["--robot", "--quiet", "check"];
        full.extend_from_slice(args);
        self.run_roster(&full)
    }

    pub fn assert_success(&self, output: &CommandOutput, context: &str) {
        assert!(
            output.success,
            "{context}: expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            output.exit_code, output.stdout, output.stderr
        );
    }

    pub fn assert_failure(&self, output: &CommandOutput, context: &str) {
        assert!(
            !output.success,
            "{context}: expected failure\nstdout:\n{}",
            output.stdout
        );
        assert_eq!(output.exit_code, Some(1), "{context}: exit code");
    }

    pub fn assert_output_contains(&self, output: &CommandOutput, needle: &str) {
        assert!(
            output.stdout.contains(needle),
            "expected stdout to contain {needle:?}\nstdout:\n{}",
            output.stdout
        );
    }
}
