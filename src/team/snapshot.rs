//! Read-only snapshot of the registry and descriptor files.
//!
//! Loading never fails: every problem reading an input is captured in the
//! snapshot so the checks can report it alongside everything else.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::TeamDescriptor;
use super::descriptor::{KvRecord, SyntaxError, parse_record};
use super::registry::{RegistryBackend, RegistryDocument, RegistryFormatError};

/// Locations of the inputs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub registry: PathBuf,
    pub descriptors: PathBuf,
    /// Descriptor file extension, without the leading dot
    pub extension: String,
}

impl InputPaths {
    /// File name a descriptor for `id` must have.
    #[must_use]
    pub fn descriptor_file_name(&self, id: &str) -> String {
        format!("{id}.{}", self.extension)
    }
}

/// Whether an input path is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathState {
    Present,
    Missing,
    /// Exists, but is a file where a directory was expected or vice versa
    WrongKind,
    Unreadable(String),
}

/// A descriptor that parsed cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDescriptor {
    pub descriptor: TeamDescriptor,
    pub record: KvRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorContent {
    Parsed(ParsedDescriptor),
    Invalid(SyntaxError),
    Unreadable(String),
}

/// One `<stem>.<ext>` file from the descriptor directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorFile {
    pub path: PathBuf,
    pub file_name: String,
    pub stem: String,
    pub content: DescriptorContent,
}

impl DescriptorFile {
    /// Read and parse a descriptor file.
    #[must_use]
    pub fn load(path: &Path, extension: &str) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(source) => match parse_record(&source) {
                Ok(record) => DescriptorContent::Parsed(ParsedDescriptor {
                    descriptor: TeamDescriptor::from_record(&record),
                    record,
                }),
                Err(err) => DescriptorContent::Invalid(err),
            },
            Err(err) => DescriptorContent::Unreadable(err.to_string()),
        };
        Self::with_content(path, extension, content)
    }

    /// A descriptor entry that could not even be listed.
    #[must_use]
    pub fn unreadable(path: &Path, extension: &str, reason: String) -> Self {
        Self::with_content(path, extension, DescriptorContent::Unreadable(reason))
    }

    fn with_content(path: &Path, extension: &str, content: DescriptorContent) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name
            .strip_suffix(&format!(".{extension}"))
            .unwrap_or(&file_name)
            .to_string();
        Self {
            path: path.to_path_buf(),
            file_name,
            stem,
            content,
        }
    }

    #[must_use]
    pub const fn parsed(&self) -> Option<&ParsedDescriptor> {
        match &self.content {
            DescriptorContent::Parsed(parsed) => Some(parsed),
            _ => None,
        }
    }
}

/// Outcome of reading the registry document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryState {
    /// The registry path is not a readable file
    NotLoaded,
    Unreadable(String),
    /// No structured parser is available for this run
    ParserUnavailable(String),
    Malformed(RegistryFormatError),
    Loaded(RegistryDocument),
}

/// Everything the checks look at, captured once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub paths: InputPaths,
    pub descriptors_dir: PathState,
    pub registry_file: PathState,
    /// Descriptor files sorted by file name
    pub descriptors: Vec<DescriptorFile>,
    pub registry: RegistryState,
}

impl Snapshot {
    /// Read both inputs from disk.
    #[must_use]
    pub fn load(paths: &InputPaths, backend: &RegistryBackend) -> Self {
        let (descriptors_dir, descriptors) = load_descriptors(paths);
        let (registry_file, registry) = load_registry(&paths.registry, backend);
        debug!(
            descriptors = descriptors.len(),
            registry = %paths.registry.display(),
            backend = backend.name(),
            "snapshot loaded"
        );
        Self {
            paths: paths.clone(),
            descriptors_dir,
            registry_file,
            descriptors,
            registry,
        }
    }

    /// The registry document, if it was parsed.
    #[must_use]
    pub const fn registry_document(&self) -> Option<&RegistryDocument> {
        match &self.registry {
            RegistryState::Loaded(document) => Some(document),
            _ => None,
        }
    }

    #[must_use]
    pub fn descriptors_available(&self) -> bool {
        self.descriptors_dir == PathState::Present
    }

    /// File names present in the descriptor directory.
    #[must_use]
    pub fn descriptor_file_names(&self) -> BTreeSet<&str> {
        self.descriptors
            .iter()
            .map(|file| file.file_name.as_str())
            .collect()
    }

    /// Descriptor files that parsed cleanly.
    pub fn parsed_descriptors(&self) -> impl Iterator<Item = (&DescriptorFile, &ParsedDescriptor)> {
        self.descriptors
            .iter()
            .filter_map(|file| file.parsed().map(|parsed| (file, parsed)))
    }
}

fn load_descriptors(paths: &InputPaths) -> (PathState, Vec<DescriptorFile>) {
    let dir = &paths.descriptors;
    if !dir.exists() {
        return (PathState::Missing, Vec::new());
    }
    if !dir.is_dir() {
        return (PathState::WrongKind, Vec::new());
    }

    let suffix = format!(".{}", paths.extension);
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return (PathState::Unreadable(err.to_string()), Vec::new());
            }
            Err(err) => {
                // A broken entry only affects itself
                let Some(path) = err.path() else {
                    continue;
                };
                let is_descriptor = path
                    .file_name()
                    .is_some_and(|name| is_descriptor_name(&name.to_string_lossy(), &suffix));
                if is_descriptor {
                    warn!(path = %path.display(), error = %err, "descriptor entry is unreadable");
                    files.push(DescriptorFile::unreadable(path, &paths.extension, err.to_string()));
                } else {
                    debug!(path = %path.display(), error = %err, "skipping unreadable entry");
                }
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if !is_descriptor_name(&entry.file_name().to_string_lossy(), &suffix) {
            continue;
        }
        files.push(DescriptorFile::load(entry.path(), &paths.extension));
    }
    (PathState::Present, files)
}

fn is_descriptor_name(name: &str, suffix: &str) -> bool {
    !name.starts_with('.') && name.ends_with(suffix) && name.len() > suffix.len()
}

fn load_registry(path: &Path, backend: &RegistryBackend) -> (PathState, RegistryState) {
    let file_state = if !path.exists() {
        PathState::Missing
    } else if path.is_file() {
        PathState::Present
    } else {
        PathState::WrongKind
    };

    let parser = match backend {
        RegistryBackend::Available(parser) => parser,
        RegistryBackend::Unavailable { reason } => {
            warn!(%reason, "registry checks will be skipped");
            return (file_state, RegistryState::ParserUnavailable(reason.clone()));
        }
    };

    if file_state != PathState::Present {
        return (file_state, RegistryState::NotLoaded);
    }

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => return (file_state, RegistryState::Unreadable(err.to_string())),
    };

    let registry = match parser.parse(&raw) {
        Ok(value) => RegistryState::Loaded(RegistryDocument::from_value(&value)),
        Err(err) => RegistryState::Malformed(err),
    };
    (file_state, registry)
}
