//! The central team registry document.
//!
//! Parsing goes through a [`RegistryBackend`]. When structured parsing is
//! unavailable the backend says so up front, and every check that depends on
//! the registry contents reports itself as skipped instead of passing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Which structured-data parser to use for the registry.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RegistryParserKind {
    /// Parse the registry as JSON
    #[default]
    Json,
    /// No structured parser; registry-dependent checks are skipped
    #[serde(alias = "disabled")]
    #[value(name = "none")]
    None,
}

impl std::str::FromStr for RegistryParserKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "none" | "disabled" | "off" => Ok(Self::None),
            other => Err(format!("unknown registry parser '{other}' (expected json|none)")),
        }
    }
}

/// The registry text could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (line {line}, column {column})")]
pub struct RegistryFormatError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// A structured-data parser capable of reading the registry.
pub trait StructuredParser: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// Parse raw registry text into a generic value tree.
    fn parse(&self, raw: &str) -> Result<Value, RegistryFormatError>;
}

/// `serde_json` backed parser.
pub struct JsonParser;

impl StructuredParser for JsonParser {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, raw: &str) -> Result<Value, RegistryFormatError> {
        serde_json::from_str(raw).map_err(|err| RegistryFormatError {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        })
    }
}

/// Parser capability selected for a run.
pub enum RegistryBackend {
    Available(Box<dyn StructuredParser>),
    Unavailable { reason: String },
}

impl RegistryBackend {
    /// Select the backend for the configured parser kind.
    #[must_use]
    pub fn detect(kind: RegistryParserKind) -> Self {
        match kind {
            RegistryParserKind::Json => Self::Available(Box::new(JsonParser)),
            RegistryParserKind::None => Self::Unavailable {
                reason: "structured-data parser disabled by configuration".to_string(),
            },
        }
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Available(parser) => parser.name(),
            Self::Unavailable { .. } => "none",
        }
    }
}

impl std::fmt::Debug for RegistryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(parser) => f.debug_tuple("Available").field(&parser.name()).finish(),
            Self::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

/// What a registry field looked like in the parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState<T> {
    Missing,
    Null,
    /// Present with the wrong JSON type (the found type name)
    WrongType(&'static str),
    Present(T),
}

impl<T> FieldState<T> {
    #[must_use]
    pub const fn present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }
}

/// One element of the registry `teams` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// 0-indexed position in the `teams` array
    pub position: usize,
    /// Whether the element is a JSON object at all
    pub is_object: bool,
    pub id: FieldState<String>,
}

impl RegistryEntry {
    /// The entry id when it is a non-empty string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id
            .present()
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
}

/// Shape-level view of a parsed registry document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryDocument {
    /// JSON type of the document root
    pub root_type: &'static str,
    pub version: FieldState<String>,
    pub teams: FieldState<Vec<RegistryEntry>>,
}

impl RegistryDocument {
    /// Interpret a parsed value tree, recording every shape deviation.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(root) = value.as_object() else {
            return Self {
                root_type: json_type(value),
                version: FieldState::Missing,
                teams: FieldState::Missing,
            };
        };

        let version = match root.get("version") {
            None => FieldState::Missing,
            Some(Value::Null) => FieldState::Null,
            Some(Value::String(version)) => FieldState::Present(version.clone()),
            Some(other) => FieldState::WrongType(json_type(other)),
        };

        let teams = match root.get("teams") {
            None => FieldState::Missing,
            Some(Value::Null) => FieldState::Null,
            Some(Value::Array(items)) => FieldState::Present(
                items
                    .iter()
                    .enumerate()
                    .map(|(position, item)| entry_from_value(position, item))
                    .collect(),
            ),
            Some(other) => FieldState::WrongType(json_type(other)),
        };

        Self {
            root_type: "object",
            version,
            teams,
        }
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        self.root_type == "object"
    }

    /// Entries of the `teams` array; empty when the field is unusable.
    #[must_use]
    pub fn entries(&self) -> &[RegistryEntry] {
        match self.teams.present() {
            Some(entries) => entries.as_slice(),
            None => &[],
        }
    }

    /// Non-empty team ids in registry order (duplicates kept).
    pub fn team_ids(&self) -> impl Iterator<Item = &str> {
        self.entries().iter().filter_map(RegistryEntry::id)
    }
}

fn entry_from_value(position: usize, value: &Value) -> RegistryEntry {
    let Some(object) = value.as_object() else {
        return RegistryEntry {
            position,
            is_object: false,
            id: FieldState::WrongType(json_type(value)),
        };
    };
    let id = match object.get("id") {
        None => FieldState::Missing,
        Some(Value::Null) => FieldState::Null,
        Some(Value::String(id)) => FieldState::Present(id.clone()),
        Some(other) => FieldState::WrongType(json_type(other)),
    };
    RegistryEntry {
        position,
        is_object: true,
        id,
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
