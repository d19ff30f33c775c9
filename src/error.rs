//! Error types for roster.

use thiserror::Error;

/// Errors raised by roster itself.
///
/// Consistency problems found in the inspected files are not errors; they are
/// reported as [`crate::check::Violation`] values. `ValidationFailed` is only
/// raised after a report has been rendered, to turn it into a failing exit.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),
}

impl RosterError {
    /// Stable machine-readable code used in robot output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io_error",
            Self::Config(_) => "config_error",
            Self::MissingConfig(_) => "missing_config",
            Self::Serialization(_) => "serialization_error",
            Self::NotFound(_) => "not_found",
            Self::ValidationFailed(_) => "validation_failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
