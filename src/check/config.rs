//! Check engine configuration.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::diagnostic::Severity;
use crate::team::Snapshot;

/// Team ids that must always be present in the registry.
pub const DEFAULT_BASELINE: [&str; 4] = ["ios", "android", "firebase", "academy"];

/// Configuration for a consistency run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Checks to disable by id
    #[serde(default)]
    pub disabled_checks: HashSet<String>,

    /// When set, only these checks run; the rest are reported as disabled
    #[serde(default)]
    pub only_checks: Option<HashSet<String>>,

    /// Severity overrides by check id
    #[serde(default)]
    pub severity_overrides: HashMap<String, Severity>,

    /// Treat warnings as errors and fail degraded runs
    #[serde(default)]
    pub strict: bool,

    /// Baseline team ids
    #[serde(default = "default_required_teams")]
    pub required_teams: Vec<String>,
}

fn default_required_teams() -> Vec<String> {
    DEFAULT_BASELINE.iter().map(ToString::to_string).collect()
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            disabled_checks: HashSet::new(),
            only_checks: None,
            severity_overrides: HashMap::new(),
            strict: false,
            required_teams: default_required_teams(),
        }
    }
}

impl CheckConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    #[must_use]
    pub fn disable_check(mut self, check_id: impl Into<String>) -> Self {
        self.disabled_checks.insert(check_id.into());
        self
    }

    /// Restrict the run to the given checks.
    #[must_use]
    pub fn only<I, S>(mut self, check_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only_checks = Some(check_ids.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn override_severity(mut self, check_id: impl Into<String>, severity: Severity) -> Self {
        self.severity_overrides.insert(check_id.into(), severity);
        self
    }

    #[must_use]
    pub fn with_required_teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_teams = teams.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn is_check_enabled(&self, check_id: &str) -> bool {
        if self.disabled_checks.contains(check_id) {
            return false;
        }
        self.only_checks
            .as_ref()
            .is_none_or(|only| only.contains(check_id))
    }

    /// Severity after overrides and strict mode.
    #[must_use]
    pub fn effective_severity(&self, check_id: &str, default: Severity) -> Severity {
        let severity = self
            .severity_overrides
            .get(check_id)
            .copied()
            .unwrap_or(default);

        if self.strict && severity == Severity::Warning {
            Severity::Error
        } else {
            severity
        }
    }
}

/// What a check sees while it runs.
pub struct CheckContext<'a> {
    pub snapshot: &'a Snapshot,
    pub config: &'a CheckConfig,
}

impl<'a> CheckContext<'a> {
    #[must_use]
    pub const fn new(snapshot: &'a Snapshot, config: &'a CheckConfig) -> Self {
        Self { snapshot, config }
    }
}
