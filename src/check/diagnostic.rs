//! Violation and status types reported by consistency checks.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of inconsistency a violation describes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A required path is missing or of the wrong kind
    StructuralError,
    /// A document could not be parsed
    FormatError,
    /// A required field is missing or empty
    SchemaError,
    /// Registry and descriptors disagree about which teams exist
    ReferentialError,
    /// An identifier is declared more than once
    DuplicateError,
    /// A required baseline team is absent from the registry
    BaselineMissingError,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StructuralError => "StructuralError",
            Self::FormatError => "FormatError",
            Self::SchemaError => "SchemaError",
            Self::ReferentialError => "ReferentialError",
            Self::DuplicateError => "DuplicateError",
            Self::BaselineMissingError => "BaselineMissingError",
        };
        f.write_str(name)
    }
}

/// Severity level for violations
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Reported, but does not fail the run
    Warning,
    /// Fails the run
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("invalid severity {other} (expected info|warning|error)")),
        }
    }
}

/// A single detected inconsistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The check that produced this violation
    pub check_id: String,
    pub kind: ViolationKind,
    pub severity: Severity,
    pub message: String,
    /// File the violation is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// 1-indexed line within `file`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Field or key name involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Team identifier involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Violation {
    pub fn new(
        check_id: impl Into<String>,
        kind: ViolationKind,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check_id: check_id.into(),
            kind,
            severity,
            message: message.into(),
            file: None,
            line: None,
            field: None,
            team: None,
            suggestion: None,
        }
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[must_use]
    pub const fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// `file[:line]` when a file is attached.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        self.file.as_ref().map(|file| match self.line {
            Some(line) => format!("{}:{line}", file.display()),
            None => file.display().to_string(),
        })
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.kind, self.check_id, self.message
        )?;
        if let Some(location) = self.location() {
            write!(f, " at {location}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (hint: {suggestion})")?;
        }
        Ok(())
    }
}

/// Why a check did not evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "kebab-case")]
pub enum SkipReason {
    /// The structured-data capability the check needs is unavailable
    ParserUnavailable(String),
    /// An input the check reads could not be loaded; another check reports why
    MissingInput(String),
    /// Turned off by configuration
    Disabled,
}

impl SkipReason {
    /// Whether this skip makes the run degraded rather than complete.
    #[must_use]
    pub const fn degrades_run(&self) -> bool {
        matches!(self, Self::ParserUnavailable(_))
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParserUnavailable(detail) => write!(f, "parser unavailable: {detail}"),
            Self::MissingInput(detail) => write!(f, "{detail}"),
            Self::Disabled => write!(f, "disabled by configuration"),
        }
    }
}

/// Final status of one check.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    /// Evaluated with only non-error violations
    Warn,
    Fail,
    Skipped,
}

impl CheckStatus {
    /// Status implied by a set of evaluated violations.
    #[must_use]
    pub fn from_violations(violations: &[Violation]) -> Self {
        if violations.iter().any(|v| v.severity == Severity::Error) {
            Self::Fail
        } else if violations.is_empty() {
            Self::Pass
        } else {
            Self::Warn
        }
    }

    /// Fixed-width label used in human output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
            Self::Skipped => "SKIP",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
