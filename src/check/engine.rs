//! Check engine: runs every registered check against one snapshot.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use super::config::{CheckConfig, CheckContext};
use super::diagnostic::{CheckStatus, Severity, SkipReason, Violation, ViolationKind};
use super::rule::{BoxedCheck, CheckOutcome};
use super::rules;
use crate::team::Snapshot;

/// Overall judgement of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Every check ran and no error was found
    Consistent,
    /// No error was found, but some checks could not run
    Degraded,
    Inconsistent,
}

impl Verdict {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Consistent => "CONSISTENT",
            Self::Degraded => "DEGRADED",
            Self::Inconsistent => "INCONSISTENT",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one check within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub id: String,
    pub title: String,
    pub kind: ViolationKind,
    pub status: CheckStatus,
    pub violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<SkipReason>,
}

/// Counts shown at the end of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub checks: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Everything a run found, in check registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub results: Vec<CheckResult>,
    pub strict: bool,
}

impl CheckReport {
    /// All violations, grouped by check in run order.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.results.iter().flat_map(|result| result.violations.iter())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations().filter(|v| v.severity == Severity::Error)
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.violations()
            .filter(|v| v.severity == Severity::Warning)
            .count()
    }

    /// Whether some check was skipped for lack of a parser capability.
    #[must_use]
    pub fn degraded(&self) -> bool {
        self.results
            .iter()
            .any(|result| result.skip.as_ref().is_some_and(SkipReason::degrades_run))
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if self.error_count() > 0 || (self.strict && self.degraded()) {
            Verdict::Inconsistent
        } else if self.degraded() {
            Verdict::Degraded
        } else {
            Verdict::Consistent
        }
    }

    /// Whether the run should exit successfully.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.verdict() != Verdict::Inconsistent
    }

    #[must_use]
    pub fn result(&self, check_id: &str) -> Option<&CheckResult> {
        self.results.iter().find(|result| result.id == check_id)
    }

    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            checks: self.results.len(),
            errors: self.error_count(),
            warnings: self.warning_count(),
            ..ReportSummary::default()
        };
        for result in &self.results {
            match result.status {
                CheckStatus::Pass => summary.passed += 1,
                CheckStatus::Warn => summary.warned += 1,
                CheckStatus::Fail => summary.failed += 1,
                CheckStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}

/// Information about a registered check
#[derive(Debug, Clone, Serialize)]
pub struct CheckInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: ViolationKind,
    pub default_severity: Severity,
    pub enabled: bool,
}

/// The engine that owns and runs checks
pub struct CheckEngine {
    checks: Vec<BoxedCheck>,
    config: CheckConfig,
}

impl CheckEngine {
    /// Engine with no checks registered
    #[must_use]
    pub fn new(config: CheckConfig) -> Self {
        Self {
            checks: Vec::new(),
            config,
        }
    }

    /// Engine with every built-in check registered
    #[must_use]
    pub fn with_builtin_checks(config: CheckConfig) -> Self {
        let mut engine = Self::new(config);
        for check in rules::all_checks() {
            engine.register(check);
        }
        engine
    }

    pub fn register(&mut self, check: BoxedCheck) {
        self.checks.push(check);
    }

    #[must_use]
    pub fn checks(&self) -> &[BoxedCheck] {
        &self.checks
    }

    #[must_use]
    pub const fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Run every check. Checks never see each other's results.
    #[must_use]
    pub fn run(&self, snapshot: &Snapshot) -> CheckReport {
        let ctx = CheckContext::new(snapshot, &self.config);
        let mut results = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            let (status, violations, skip) = if self.config.is_check_enabled(check.id()) {
                match check.run(&ctx) {
                    CheckOutcome::Evaluated(mut violations) => {
                        for violation in &mut violations {
                            violation.severity = self
                                .config
                                .effective_severity(&violation.check_id, violation.severity);
                        }
                        (CheckStatus::from_violations(&violations), violations, None)
                    }
                    CheckOutcome::Skipped(reason) => (CheckStatus::Skipped, Vec::new(), Some(reason)),
                }
            } else {
                (CheckStatus::Skipped, Vec::new(), Some(SkipReason::Disabled))
            };

            debug!(
                check = check.id(),
                status = %status,
                violations = violations.len(),
                "check finished"
            );
            results.push(CheckResult {
                id: check.id().to_string(),
                title: check.title().to_string(),
                kind: check.kind(),
                status,
                violations,
                skip,
            });
        }

        let report = CheckReport {
            results,
            strict: self.config.strict,
        };
        info!(
            verdict = %report.verdict(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            "consistency run complete"
        );
        report
    }

    /// Describe every registered check.
    #[must_use]
    pub fn list_checks(&self) -> Vec<CheckInfo> {
        self.checks
            .iter()
            .map(|check| CheckInfo {
                id: check.id().to_string(),
                title: check.title().to_string(),
                description: check.description().to_string(),
                kind: check.kind(),
                default_severity: check.default_severity(),
                enabled: self.config.is_check_enabled(check.id()),
            })
            .collect()
    }
}
