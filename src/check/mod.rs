//! Registry consistency checking.
//!
//! A [`CheckEngine`] runs every registered [`ConsistencyCheck`] against one
//! [`crate::team::Snapshot`] and collects the outcome of each into a
//! [`CheckReport`]. Checks are independent: a problem found by one never
//! stops another from running.

pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod rule;
pub mod rules;

pub use config::{CheckConfig, CheckContext, DEFAULT_BASELINE};
pub use diagnostic::{CheckStatus, Severity, SkipReason, Violation, ViolationKind};
pub use engine::{CheckEngine, CheckInfo, CheckReport, CheckResult, ReportSummary, Verdict};
pub use rule::{BoxedCheck, CheckOutcome, ConsistencyCheck};
