//! Team data model and the loaders for registry and descriptor files.
//!
//! - `descriptor`: flat key-value descriptor files (`teams/<id>.conf`)
//! - `registry`: the central registry document and its parser backends
//! - `snapshot`: one read-only view of both inputs, taken per run

pub mod descriptor;
pub mod registry;
pub mod snapshot;

use serde::Serialize;

pub use descriptor::{KvEntry, KvRecord, KvValue, SyntaxError, parse_record};
pub use registry::{
    FieldState, JsonParser, RegistryBackend, RegistryDocument, RegistryEntry,
    RegistryFormatError, RegistryParserKind, StructuredParser,
};
pub use snapshot::{
    DescriptorContent, DescriptorFile, InputPaths, ParsedDescriptor, PathState, RegistryState,
    Snapshot,
};

/// Descriptor key holding the team identifier.
pub const KEY_ID: &str = "TEAM_ID";
/// Descriptor key holding the display name.
pub const KEY_NAME: &str = "TEAM_NAME";
/// Descriptor key holding the summary.
pub const KEY_DESCRIPTION: &str = "TEAM_DESCRIPTION";
/// Descriptor key holding the ordered agent list.
pub const KEY_AGENTS: &str = "TEAM_AGENTS";

/// One team as declared by its descriptor file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub agents: Vec<String>,
}

impl TeamDescriptor {
    /// Build a descriptor from a parsed key-value record.
    ///
    /// Missing keys map to empty values; the consistency checks decide
    /// whether that is acceptable. Unknown keys are ignored.
    #[must_use]
    pub fn from_record(record: &KvRecord) -> Self {
        let text = |key: &str| record.get(key).map(KvValue::as_text).unwrap_or_default();
        Self {
            id: text(KEY_ID),
            name: text(KEY_NAME),
            description: text(KEY_DESCRIPTION),
            agents: record.get(KEY_AGENTS).map(KvValue::items).unwrap_or_default(),
        }
    }

    /// Agents with surrounding whitespace removed, blanks dropped.
    pub fn listed_agents(&self) -> impl Iterator<Item = &str> {
        self.agents
            .iter()
            .map(|agent| agent.trim())
            .filter(|agent| !agent.is_empty())
    }
}
