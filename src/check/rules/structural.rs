//! Structural checks: the input paths exist and are of the right kind.

use crate::check::config::CheckContext;
use crate::check::diagnostic::ViolationKind;
use crate::check::rule::{BoxedCheck, CheckOutcome, ConsistencyCheck};
use crate::team::PathState;

use super::require_descriptors;

/// The descriptor directory exists and is a directory.
pub struct DescriptorDirExistsCheck;

impl ConsistencyCheck for DescriptorDirExistsCheck {
    fn id(&self) -> &'static str {
        "descriptor-dir-exists"
    }

    fn title(&self) -> &'static str {
        "Descriptor directory exists"
    }

    fn description(&self) -> &'static str {
        "The descriptor directory must exist and be a readable directory"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::StructuralError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        let dir = &ctx.snapshot.paths.descriptors;
        let message = match &ctx.snapshot.descriptors_dir {
            PathState::Present => return CheckOutcome::pass(),
            PathState::Missing => format!("descriptor directory {} does not exist", dir.display()),
            PathState::WrongKind => format!("{} is not a directory", dir.display()),
            PathState::Unreadable(err) => {
                format!("descriptor directory {} could not be read: {err}", dir.display())
            }
        };
        vec![self.violation(message).with_file(dir)].into()
    }
}

/// The registry document exists and is a regular file.
pub struct RegistryExistsCheck;

impl ConsistencyCheck for RegistryExistsCheck {
    fn id(&self) -> &'static str {
        "registry-exists"
    }

    fn title(&self) -> &'static str {
        "Registry exists"
    }

    fn description(&self) -> &'static str {
        "The registry document must exist and be a regular file"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::StructuralError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        let path = &ctx.snapshot.paths.registry;
        let message = match &ctx.snapshot.registry_file {
            PathState::Present => return CheckOutcome::pass(),
            PathState::Missing => format!("registry {} does not exist", path.display()),
            PathState::WrongKind => format!("registry {} is not a regular file", path.display()),
            PathState::Unreadable(err) => {
                format!("registry {} could not be read: {err}", path.display())
            }
        };
        vec![self.violation(message).with_file(path)].into()
    }
}

/// At least one descriptor file is present.
pub struct DescriptorSetNonEmptyCheck;

impl ConsistencyCheck for DescriptorSetNonEmptyCheck {
    fn id(&self) -> &'static str {
        "descriptor-set-non-empty"
    }

    fn title(&self) -> &'static str {
        "Descriptor set non-empty"
    }

    fn description(&self) -> &'static str {
        "The descriptor directory must contain at least one descriptor file"
    }

    fn kind(&self) -> ViolationKind {
        ViolationKind::SchemaError
    }

    fn run(&self, ctx: &CheckContext<'_>) -> CheckOutcome {
        if let Err(reason) = require_descriptors(ctx) {
            return CheckOutcome::Skipped(reason);
        }
        if !ctx.snapshot.descriptors.is_empty() {
            return CheckOutcome::pass();
        }
        let paths = &ctx.snapshot.paths;
        vec![
            self.violation(format!(
                "no descriptor files matching *.{} in {}",
                paths.extension,
                paths.descriptors.display()
            ))
            .with_file(&paths.descriptors),
        ]
        .into()
    }
}

pub fn structural_checks() -> Vec<BoxedCheck> {
    vec![
        Box::new(DescriptorDirExistsCheck),
        Box::new(RegistryExistsCheck),
        Box::new(DescriptorSetNonEmptyCheck),
    ]
}
