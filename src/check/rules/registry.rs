//! Checks over the registry document itself.

use std::collections::{BTreeSet, HashMap};

use crate::check::config::CheckContext;
use crate::check::diagnostic::{SkipReason, ViolationKind};
use crate::check::rule::{BoxedCheck, CheckOutcome, ConsistencyCheck};
use crate::team::{FieldState, RegistryState};

use super::registry_document;

/// The registry parses as structured data.
pub struct RegistryParsesCheck;

impl ConsistencyCheck for RegistryParsesCheck {
    fn id(&self) -> &'static str {
        "registry-parses"
    }

    fn title(&self) -> &'static str {
        "Registry parses"
    }

    fn description(&self) -> &'static str {
        "The registry document must be well-formed structured data"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::FormatError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        let path = &ctx.snapshot.paths.registry;
        match &ctx.snapshot.registry {
            RegistryState::Malformed(err) => vec![
                self.violation(format!("registry is not valid JSON: {}", err.message))
                    .with_file(path)
                    .with_line(err.line),
            ]
            .into(),
            RegistryState::Unreadable(err) => vec![
                self.violation(format!("registry could not be read: {err}"))
                    .with_file(path),
            ]
            .into(),
            _ => match registry_document(ctx) {
                Ok(_) => CheckOutcome::pass(),
                Err(reason) => CheckOutcome::Skipped(reason),
            },
        }
    }
}

/// The registry has a non-empty `version` and a `teams` array of objects
/// that each carry a non-empty string `id`.
pub struct RegistryShapeCheck;

impl ConsistencyCheck for RegistryShapeCheck {
    fn id(&self) -> &'static str {
        "registry-shape"
    }

    fn title(&self) -> &'static str {
        "Registry shape"
    }

    fn description(&self) -> &'static str {
        "The registry must be an object with a non-empty `version` string and a `teams` array \
         whose entries are objects with a non-empty string `id`"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::SchemaError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        let document = match registry_document(ctx) {
            Ok(document) => document,
            Err(reason) => return CheckOutcome::Skipped(reason),
        };
        let path = &ctx.snapshot.paths.registry;
        let problem = |field: String, message: String| {
            self.violation(message).with_file(path).with_field(field)
        };

        if !document.is_object() {
            return vec![problem(
                "$".to_string(),
                format!("registry root must be an object, found {}", document.root_type),
            )]
            .into();
        }

        let mut violations = Vec::new();
        match &document.version {
            FieldState::Present(version) if !version.trim().is_empty() => {}
            FieldState::Present(_) => {
                violations.push(problem("version".into(), "`version` is empty".into()));
            }
            FieldState::Missing => {
                violations.push(problem("version".into(), "`version` is missing".into()));
            }
            FieldState::Null => {
                violations.push(problem("version".into(), "`version` is null".into()));
            }
            FieldState::WrongType(found) => violations.push(problem(
                "version".into(),
                format!("`version` must be a string, found {found}"),
            )),
        }

        match &document.teams {
            FieldState::Present(_) => {}
            FieldState::Missing => {
                violations.push(problem("teams".into(), "`teams` is missing".into()));
            }
            FieldState::Null => {
                violations.push(problem("teams".into(), "`teams` is null".into()));
            }
            FieldState::WrongType(found) => violations.push(problem(
                "teams".into(),
                format!("`teams` must be an array, found {found}"),
            )),
        }

        for entry in document.entries() {
            let field = format!("teams[{}].id", entry.position);
            if !entry.is_object {
                let found = match entry.id {
                    FieldState::WrongType(found) => found,
                    _ => "a non-object",
                };
                violations.push(problem(
                    format!("teams[{}]", entry.position),
                    format!("teams[{}] must be an object, found {found}", entry.position),
                ));
                continue;
            }
            let message = match &entry.id {
                FieldState::Present(id) if !id.is_empty() => continue,
                FieldState::Present(_) => format!("{field} is empty"),
                FieldState::Missing => format!("{field} is missing"),
                FieldState::Null => format!("{field} is null"),
                FieldState::WrongType(found) => format!("{field} must be a string, found {found}"),
            };
            violations.push(problem(field, message));
        }

        violations.into()
    }
}

/// The `teams` array has at least one entry.
pub struct RegistryNonEmptyCheck;

impl ConsistencyCheck for RegistryNonEmptyCheck {
    fn id(&self) -> &'static str {
        "registry-non-empty"
    }

    fn title(&self) -> &'static str {
        "Registry non-empty"
    }

    fn description(&self) -> &'static str {
        "The registry `teams` array must have at least one entry"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::SchemaError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        let document = match registry_document(ctx) {
            Ok(document) => document,
            Err(reason) => return CheckOutcome::Skipped(reason),
        };
        let Some(entries) = document.teams.present() else {
            return CheckOutcome::Skipped(SkipReason::MissingInput(
                "registry has no usable `teams` array".to_string(),
            ));
        };
        if entries.is_empty() {
            vec![
                self.violation("registry `teams` array is empty")
                    .with_file(&ctx.snapshot.paths.registry)
                    .with_field("teams"),
            ]
            .into()
        } else {
            CheckOutcome::pass()
        }
    }
}

/// No team id appears twice in the registry.
pub struct UniqueRegistryIdsCheck;

impl ConsistencyCheck for UniqueRegistryIdsCheck {
    fn id(&self) -> &'static str {
        "unique-registry-ids"
    }

    fn title(&self) -> &'static str {
        "Unique registry ids"
    }

    fn description(&self) -> &'static str {
        "Each team id may appear only once in the registry `teams` array"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::DuplicateError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        let document = match registry_document(ctx) {
            Ok(document) => document,
            Err(reason) => return CheckOutcome::Skipped(reason),
        };
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        let mut violations = Vec::new();
        for entry in document.entries() {
            let Some(id) = entry.id() else {
                continue;
            };
            match first_seen.get(id) {
                Some(first) => violations.push(
                    self.violation(format!(
                        "registry lists team '{id}' more than once (teams[{first}] and teams[{}])",
                        entry.position
                    ))
                    .with_file(&ctx.snapshot.paths.registry)
                    .with_field(format!("teams[{}].id", entry.position))
                    .with_team(id),
                ),
                None => {
                    first_seen.insert(id, entry.position);
                }
            }
        }
        violations.into()
    }
}

/// Every required baseline team is listed in the registry.
pub struct BaselineTeamsCheck;

impl ConsistencyCheck for BaselineTeamsCheck {
    fn id(&self) -> &'static str {
        "baseline-teams"
    }

    fn title(&self) -> &'static str {
        "Baseline teams present"
    }

    fn description(&self) -> &'static str {
        "Every team in the configured baseline must have a registry entry"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::BaselineMissingError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        let document = match registry_document(ctx) {
            Ok(document) => document,
            Err(reason) => return CheckOutcome::Skipped(reason),
        };
        let listed: BTreeSet<&str> = document.team_ids().collect();
        ctx.config
            .required_teams
            .iter()
            .filter(|required| !listed.contains(required.as_str()))
            .map(|required| {
                self.violation(format!("baseline team '{required}' is missing from the registry"))
                    .with_file(&ctx.snapshot.paths.registry)
                    .with_team(required)
                    .with_suggestion(format!("add {{\"id\": \"{required}\"}} to `teams`"))
            })
            .collect::<Vec<_>>()
            .into()
    }
}

pub fn registry_checks() -> Vec<BoxedCheck> {
    vec![
        Box::new(RegistryParsesCheck),
        Box::new(RegistryShapeCheck),
        Box::new(RegistryNonEmptyCheck),
        Box::new(UniqueRegistryIdsCheck),
        Box::new(BaselineTeamsCheck),
    ]
}
