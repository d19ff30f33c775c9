//! Checks over individual descriptor files and the descriptor set.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::check::config::CheckContext;
use crate::check::diagnostic::{Severity, ViolationKind};
use crate::check::rule::{BoxedCheck, CheckOutcome, ConsistencyCheck};
use crate::team::{DescriptorContent, KEY_AGENTS, KEY_DESCRIPTION, KEY_ID, KEY_NAME};

use super::require_descriptors;

static TEAM_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_-]*$").expect("valid regex"));

/// Every descriptor parses as a flat key-value record.
pub struct DescriptorSyntaxCheck;

impl ConsistencyCheck for DescriptorSyntaxCheck {
    fn id(&self) -> &'static str {
        "descriptor-syntax"
    }

    fn title(&self) -> &'static str {
        "Descriptor syntax"
    }

    fn description(&self) -> &'static str {
        "Descriptor files must be flat KEY=VALUE records with no command substitution, \
         variable expansion or shell operators"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::FormatError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        if let Err(reason) = require_descriptors(ctx) {
            return CheckOutcome::Skipped(reason);
        }
        ctx.snapshot
            .descriptors
            .iter()
            .filter_map(|file| match &file.content {
                DescriptorContent::Parsed(_) => None,
                DescriptorContent::Invalid(err) => Some(
                    self.violation(format!(
                        "{} is not a valid key-value record: {}",
                        file.file_name, err.message
                    ))
                    .with_file(&file.path)
                    .with_line(err.line),
                ),
                DescriptorContent::Unreadable(err) => Some(
                    self.violation(format!("{} could not be read: {err}", file.file_name))
                        .with_file(&file.path),
                ),
            })
            .collect::<Vec<_>>()
            .into()
    }
}

/// Every descriptor defines its id, name, description and at least one agent.
pub struct DescriptorRequiredFieldsCheck;

impl ConsistencyCheck for DescriptorRequiredFieldsCheck {
    fn id(&self) -> &'static str {
        "descriptor-required-fields"
    }

    fn title(&self) -> &'static str {
        "Descriptor required fields"
    }

    fn description(&self) -> &'static str {
        "TEAM_ID, TEAM_NAME and TEAM_DESCRIPTION must be non-empty and TEAM_AGENTS must list \
         at least one agent"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::SchemaError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        if let Err(reason) = require_descriptors(ctx) {
            return CheckOutcome::Skipped(reason);
        }
        let mut violations = Vec::new();
        for (file, parsed) in ctx.snapshot.parsed_descriptors() {
            let team = &parsed.descriptor;
            let text_fields = [
                (KEY_ID, team.id.as_str()),
                (KEY_NAME, team.name.as_str()),
                (KEY_DESCRIPTION, team.description.as_str()),
            ];
            let missing = text_fields
                .iter()
                .filter(|(_, value)| value.trim().is_empty())
                .map(|(key, _)| (*key, format!("{} has no {key} (missing or empty)", file.file_name)));
            let agents = (team.listed_agents().next().is_none()).then(|| {
                (
                    KEY_AGENTS,
                    format!("{} lists no agents in {KEY_AGENTS}", file.file_name),
                )
            });

            for (key, message) in missing.chain(agents) {
                let mut violation = self
                    .violation(message)
                    .with_file(&file.path)
                    .with_field(key);
                if let Some(entry) = parsed.record.entries().iter().rev().find(|e| e.key == key) {
                    violation = violation.with_line(entry.line);
                }
                if !team.id.is_empty() {
                    violation = violation.with_team(&team.id);
                }
                violations.push(violation);
            }
        }
        violations.into()
    }
}

/// A key is assigned at most once per descriptor.
pub struct DescriptorDuplicateKeysCheck;

impl ConsistencyCheck for DescriptorDuplicateKeysCheck {
    fn id(&self) -> &'static str {
        "descriptor-duplicate-keys"
    }

    fn title(&self) -> &'static str {
        "Descriptor duplicate keys"
    }

    fn description(&self) -> &'static str {
        "A key assigned twice in one descriptor is ambiguous; the last assignment wins"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::DuplicateError
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        if let Err(reason) = require_descriptors(ctx) {
            return CheckOutcome::Skipped(reason);
        }
        let mut violations = Vec::new();
        for (file, parsed) in ctx.snapshot.parsed_descriptors() {
            for duplicate in parsed.record.duplicate_keys() {
                violations.push(
                    self.violation(format!(
                        "{} assigns {} again (first on line {}); the last value wins",
                        file.file_name, duplicate.key, duplicate.first_line
                    ))
                    .with_file(&file.path)
                    .with_line(duplicate.line)
                    .with_field(duplicate.key),
                );
            }
        }
        violations.into()
    }
}

/// No two descriptor files declare the same team id.
pub struct UniqueDescriptorIdsCheck;

impl ConsistencyCheck for UniqueDescriptorIdsCheck {
    fn id(&self) -> &'static str {
        "unique-descriptor-ids"
    }

    fn title(&self) -> &'static str {
        "Unique descriptor ids"
    }

    fn description(&self) -> &'static str {
        "Each TEAM_ID may be declared by only one descriptor file"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::DuplicateError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        if let Err(reason) = require_descriptors(ctx) {
            return CheckOutcome::Skipped(reason);
        }
        let mut first_seen: HashMap<&str, &str> = HashMap::new();
        let mut violations = Vec::new();
        for (file, parsed) in ctx.snapshot.parsed_descriptors() {
            let id = parsed.descriptor.id.as_str();
            if id.is_empty() {
                continue;
            }
            match first_seen.get(id) {
                Some(first) => violations.push(
                    self.violation(format!(
                        "team id '{id}' is declared by both {first} and {}",
                        file.file_name
                    ))
                    .with_file(&file.path)
                    .with_field(KEY_ID)
                    .with_team(id),
                ),
                None => {
                    first_seen.insert(id, &file.file_name);
                }
            }
        }
        violations.into()
    }
}

/// A descriptor's file stem equals its TEAM_ID.
pub struct DescriptorFilenameMatchCheck;

impl ConsistencyCheck for DescriptorFilenameMatchCheck {
    fn id(&self) -> &'static str {
        "descriptor-filename-match"
    }

    fn title(&self) -> &'static str {
        "Descriptor filename matches id"
    }

    fn description(&self) -> &'static str {
        "A descriptor named <stem>.<ext> must declare TEAM_ID=<stem> exactly"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::ReferentialError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        if let Err(reason) = require_descriptors(ctx) {
            return CheckOutcome::Skipped(reason);
        }
        let paths = &ctx.snapshot.paths;
        ctx.snapshot
            .parsed_descriptors()
            .filter(|(file, parsed)| {
                let id = parsed.descriptor.id.as_str();
                !id.is_empty() && id != file.stem
            })
            .map(|(file, parsed)| {
                let id = &parsed.descriptor.id;
                self.violation(format!(
                    "{} declares TEAM_ID '{id}', which does not match its file name",
                    file.file_name
                ))
                .with_file(&file.path)
                .with_field(KEY_ID)
                .with_team(id)
                .with_suggestion(format!(
                    "rename it to {} or set TEAM_ID={}",
                    paths.descriptor_file_name(id),
                    file.stem
                ))
            })
            .collect::<Vec<_>>()
            .into()
    }
}

/// Team ids are lowercase tokens.
pub struct TeamIdFormatCheck;

impl TeamIdFormatCheck {
    #[must_use]
    pub fn is_valid_id(id: &str) -> bool {
        TEAM_ID_PATTERN.is_match(id)
    }
}

impl ConsistencyCheck for TeamIdFormatCheck {
    fn id(&self) -> &'static str {
        "team-id-format"
    }

    fn title(&self) -> &'static str {
        "Team id format"
    }

    fn description(&self) -> &'static str {
        "Team ids should be lowercase tokens matching [a-z][a-z0-9_-]*"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::SchemaError
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        let mut violations = Vec::new();
        if ctx.snapshot.descriptors_available() {
            for (file, parsed) in ctx.snapshot.parsed_descriptors() {
                let id = parsed.descriptor.id.as_str();
                if !id.is_empty() && !Self::is_valid_id(id) {
                    violations.push(
                        self.violation(format!(
                            "{} declares TEAM_ID '{id}', which is not a lowercase token",
                            file.file_name
                        ))
                        .with_file(&file.path)
                        .with_field(KEY_ID)
                        .with_team(id),
                    );
                }
            }
        }
        if let Some(document) = ctx.snapshot.registry_document() {
            for entry in document.entries() {
                let Some(id) = entry.id() else {
                    continue;
                };
                if !Self::is_valid_id(id) {
                    violations.push(
                        self.violation(format!(
                            "registry team id '{id}' is not a lowercase token"
                        ))
                        .with_file(&ctx.snapshot.paths.registry)
                        .with_field(format!("teams[{}].id", entry.position))
                        .with_team(id),
                    );
                }
            }
        }
        violations.into()
    }
}

pub fn descriptor_checks() -> Vec<BoxedCheck> {
    vec![
        Box::new(DescriptorSyntaxCheck),
        Box::new(DescriptorRequiredFieldsCheck),
        Box::new(DescriptorDuplicateKeysCheck),
        Box::new(UniqueDescriptorIdsCheck),
        Box::new(DescriptorFilenameMatchCheck),
        Box::new(TeamIdFormatCheck),
    ]
}
