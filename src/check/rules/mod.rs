//! Built-in consistency checks.
//!
//! - **Structural** (`structural`): the input paths exist and are usable
//! - **Registry** (`registry`): the registry document parses and has the expected shape
//! - **Descriptor** (`descriptor`): each descriptor file parses and is complete
//! - **Reference** (`reference`): registry and descriptors name the same teams
//!
//! # Usage
//!
//! ```
//! use roster::check::{CheckConfig, CheckEngine};
//! use roster::check::rules::all_checks;
//!
//! let mut engine = CheckEngine::new(CheckConfig::default());
//! for check in all_checks() {
//!     engine.register(check);
//! }
//! assert!(!engine.checks().is_empty());
//! ```

pub mod descriptor;
pub mod reference;
pub mod registry;
pub mod structural;

use crate::check::config::CheckContext;
use crate::check::diagnostic::SkipReason;
use crate::check::rule::BoxedCheck;
use crate::team::{RegistryDocument, RegistryState};

pub use descriptor::{
    DescriptorDuplicateKeysCheck, DescriptorFilenameMatchCheck, DescriptorRequiredFieldsCheck,
    DescriptorSyntaxCheck, TeamIdFormatCheck, UniqueDescriptorIdsCheck,
};
pub use reference::{DescriptorRegistryCoverageCheck, RegistryDescriptorCoverageCheck};
pub use registry::{
    BaselineTeamsCheck, RegistryNonEmptyCheck, RegistryParsesCheck, RegistryShapeCheck,
    UniqueRegistryIdsCheck,
};
pub use structural::{DescriptorDirExistsCheck, DescriptorSetNonEmptyCheck, RegistryExistsCheck};

/// Returns every built-in check in reporting order.
#[must_use]
pub fn all_checks() -> Vec<BoxedCheck> {
    let mut checks = structural::structural_checks();
    checks.extend(registry::registry_checks());
    checks.extend(descriptor::descriptor_checks());
    checks.extend(reference::reference_checks());
    checks
}

/// The parsed registry, or the reason a registry-dependent check must skip.
pub(crate) fn registry_document<'a>(
    ctx: &CheckContext<'a>,
) -> Result<&'a RegistryDocument, SkipReason> {
    match &ctx.snapshot.registry {
        RegistryState::Loaded(document) => Ok(document),
        RegistryState::ParserUnavailable(reason) => {
            Err(SkipReason::ParserUnavailable(reason.clone()))
        }
        RegistryState::NotLoaded => Err(SkipReason::MissingInput(
            "registry file is not available".to_string(),
        )),
        RegistryState::Unreadable(_) => Err(SkipReason::MissingInput(
            "registry file could not be read".to_string(),
        )),
        RegistryState::Malformed(_) => Err(SkipReason::MissingInput(
            "registry document did not parse".to_string(),
        )),
    }
}

/// Skip reason when the descriptor directory cannot be listed.
pub(crate) fn require_descriptors(ctx: &CheckContext<'_>) -> Result<(), SkipReason> {
    if ctx.snapshot.descriptors_available() {
        Ok(())
    } else {
        Err(SkipReason::MissingInput(
            "descriptor directory is not available".to_string(),
        ))
    }
}
