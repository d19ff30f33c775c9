//! Consistency check trait.

use super::config::CheckContext;
use super::diagnostic::{Severity, SkipReason, Violation, ViolationKind};

/// Result of running one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The check ran; an empty list means it passed
    Evaluated(Vec<Violation>),
    Skipped(SkipReason),
}

impl CheckOutcome {
    #[must_use]
    pub const fn pass() -> Self {
        Self::Evaluated(Vec::new())
    }
}

impl From<Vec<Violation>> for CheckOutcome {
    fn from(violations: Vec<Violation>) -> Self {
        Self::Evaluated(violations)
    }
}

/// A single consistency check over a [`crate::team::Snapshot`].
///
/// Checks are stateless and independent of each other. A check that cannot
/// evaluate because an input is unusable returns [`CheckOutcome::Skipped`]
/// and leaves reporting the input problem to the check that owns it.
pub trait ConsistencyCheck: Send + Sync {
    /// Stable identifier (e.g. "registry-exists")
    fn id(&self) -> &'static str;

    /// Short human-readable title
    fn title(&self) -> &'static str;

    /// What the check verifies
    fn description(&self) -> &'static str;

    /// Kind of violation this check reports
    fn kind(&self) -> ViolationKind;

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome;

    /// Start a violation attributed to this check.
    fn violation(&self, message: impl Into<String>) -> Violation
    where
        Self: Sized,
    {
        Violation::new(self.id(), self.kind(), self.default_severity(), message)
    }
}

/// A boxed check for dynamic dispatch
pub type BoxedCheck = Box<dyn ConsistencyCheck>;
