//! Cross-reference checks between the registry and the descriptor set.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::check::config::CheckContext;
use crate::check::diagnostic::ViolationKind;
use crate::check::rule::{BoxedCheck, CheckOutcome, ConsistencyCheck};

use super::{registry_document, require_descriptors};

/// Every registry entry has a descriptor file named exactly `<id>.<ext>`.
pub struct RegistryDescriptorCoverageCheck;

impl ConsistencyCheck for RegistryDescriptorCoverageCheck {
    fn id(&self) -> &'static str {
        "registry-descriptor-coverage"
    }

    fn title(&self) -> &'static str {
        "Registry entries have descriptors"
    }

    fn description(&self) -> &'static str {
        "Each registry team id must have a descriptor file named exactly <id>.<ext> \
         (case-sensitive)"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::ReferentialError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        let document = match registry_document(ctx) {
            Ok(document) => document,
            Err(reason) => return CheckOutcome::Skipped(reason),
        };
        if let Err(reason) = require_descriptors(ctx) {
            return CheckOutcome::Skipped(reason);
        }

        let paths = &ctx.snapshot.paths;
        let present = ctx.snapshot.descriptor_file_names();
        document
            .team_ids()
            .unique()
            .filter_map(|id| {
                let expected = paths.descriptor_file_name(id);
                if present.contains(expected.as_str()) {
                    return None;
                }
                let path = paths.descriptors.join(&expected);
                Some(
                    self.violation(format!(
                        "registry team '{id}' has no descriptor file {expected}"
                    ))
                    .with_file(&paths.registry)
                    .with_team(id)
                    .with_suggestion(format!("create {}", path.display())),
                )
            })
            .collect::<Vec<_>>()
            .into()
    }
}

/// Every descriptor's team id is listed in the registry.
pub struct DescriptorRegistryCoverageCheck;

impl ConsistencyCheck for DescriptorRegistryCoverageCheck {
    fn id(&self) -> &'static str {
        "descriptor-registry-coverage"
    }

    fn title(&self) -> &'static str {
        "Descriptors have registry entries"
    }

    fn description(&self) -> &'static str {
        "Each descriptor's TEAM_ID must appear among the registry team ids"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::ReferentialError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        let document = match registry_document(ctx) {
            Ok(document) => document,
            Err(reason) => return CheckOutcome::Skipped(reason),
        };
        if let Err(reason) = require_descriptors(ctx) {
            return CheckOutcome::Skipped(reason);
        }

        let listed: BTreeSet<&str> = document.team_ids().collect();
        ctx.snapshot
            .parsed_descriptors()
            .filter(|(_, parsed)| {
                let id = parsed.descriptor.id.as_str();
                !id.is_empty() && !listed.contains(id)
            })
            .map(|(file, parsed)| {
                let id = &parsed.descriptor.id;
                self.violation(format!(
                    "descriptor has no registry entry: {} declares team '{id}'",
                    file.file_name
                ))
                .with_file(&file.path)
                .with_team(id)
                .with_suggestion(format!(
                    "add {{\"id\": \"{id}\"}} to `teams` in {}",
                    ctx.snapshot.paths.registry.display()
                ))
            })
            .collect::<Vec<_>>()
            .into()
    }
}

pub fn reference_checks() -> Vec<BoxedCheck> {
    vec![
        Box::new(RegistryDescriptorCoverageCheck),
        Box::new(DescriptorRegistryCoverageCheck),
    ]
}
