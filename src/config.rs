use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::check::{CheckConfig, DEFAULT_BASELINE, Severity};
use crate::error::{Result, RosterError};
use crate::team::{InputPaths, RegistryParserKind};

/// Project config file name, also used to discover the project root.
pub const PROJECT_CONFIG_FILE: &str = "roster.toml";

/// Environment lookup used when applying overrides.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub baseline: BaselineConfig,
    #[serde(default)]
    pub checks: ChecksConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load config for a project rooted at `root`.
    ///
    /// An explicit path (or `ROSTER_CONFIG`) replaces the global and project
    /// layers; environment overrides always apply last.
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();
        let global = dirs::config_dir().map(|dir| dir.join("roster/config.toml"));
        Self::load_from(explicit_path, global.as_deref(), root, &env)
    }

    /// [`Config::load`] with the global config location and environment injected.
    pub fn load_from(
        explicit_path: Option<&Path>,
        global_path: Option<&Path>,
        root: &Path,
        env: EnvLookup<'_>,
    ) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env("ROSTER_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                RosterError::MissingConfig(format!("config file {} not found", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = global_path {
                if let Some(patch) = Self::load_patch(global)? {
                    config.merge_patch(patch);
                }
            }
            if let Some(patch) = Self::load_patch(&root.join(PROJECT_CONFIG_FILE))? {
                config.merge_patch(patch);
            }
        }

        config.apply_env_overrides(env)?;
        config.validate()?;

        Ok(config)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| RosterError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| RosterError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.paths {
            self.paths.merge(patch);
        }
        if let Some(patch) = patch.registry {
            self.registry.merge(patch);
        }
        if let Some(patch) = patch.baseline {
            self.baseline.merge(patch);
        }
        if let Some(patch) = patch.checks {
            self.checks.merge(patch);
        }
        if let Some(patch) = patch.output {
            self.output.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self, env: EnvLookup<'_>) -> Result<()> {
        if let Some(value) = env("ROSTER_REGISTRY") {
            self.paths.registry = PathBuf::from(value);
        }
        if let Some(value) = env("ROSTER_DESCRIPTORS") {
            self.paths.descriptors = PathBuf::from(value);
        }
        if let Some(value) = env("ROSTER_DESCRIPTOR_EXTENSION") {
            self.paths.descriptor_extension = value;
        }
        if let Some(value) = env("ROSTER_REGISTRY_PARSER") {
            self.registry.parser = value.parse().map_err(|err| {
                RosterError::Config(format!("invalid ROSTER_REGISTRY_PARSER: {err}"))
            })?;
        }
        if let Some(values) = env_list(env, "ROSTER_BASELINE") {
            self.baseline.required = values;
        }
        if let Some(strict) = env_bool(env, "ROSTER_STRICT")? {
            self.checks.strict = strict;
        }
        if let Some(values) = env_list(env, "ROSTER_DISABLED_CHECKS") {
            self.checks.disabled = merge_unique(values, &self.checks.disabled);
        }
        if let Some(value) = env("ROSTER_OUTPUT_FORMAT") {
            self.output.format = value.parse().map_err(|err| {
                RosterError::Config(format!("invalid ROSTER_OUTPUT_FORMAT: {err}"))
            })?;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        let extension = self
            .paths
            .descriptor_extension
            .trim()
            .trim_start_matches('.')
            .to_string();
        if extension.is_empty() || extension.contains(['/', '\\']) {
            return Err(RosterError::Config(format!(
                "invalid descriptor extension '{}'",
                self.paths.descriptor_extension
            )));
        }
        self.paths.descriptor_extension = extension;
        Ok(())
    }

    /// Input locations with relative paths resolved against `root`.
    #[must_use]
    pub fn input_paths(&self, root: &Path) -> InputPaths {
        InputPaths {
            registry: root.join(&self.paths.registry),
            descriptors: root.join(&self.paths.descriptors),
            extension: self.paths.descriptor_extension.clone(),
        }
    }

    /// Engine settings derived from the `[checks]` and `[baseline]` sections.
    #[must_use]
    pub fn check_config(&self) -> CheckConfig {
        CheckConfig {
            disabled_checks: self.checks.disabled.iter().cloned().collect(),
            only_checks: None,
            severity_overrides: self
                .checks
                .severity
                .iter()
                .map(|(id, severity)| (id.clone(), *severity))
                .collect(),
            strict: self.checks.strict,
            required_teams: self.baseline.required.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Registry document, relative to the project root
    pub registry: PathBuf,
    /// Descriptor directory, relative to the project root
    pub descriptors: PathBuf,
    pub descriptor_extension: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            registry: PathBuf::from("teams/registry.json"),
            descriptors: PathBuf::from("teams"),
            descriptor_extension: "conf".to_string(),
        }
    }
}

impl PathsConfig {
    fn merge(&mut self, patch: PathsPatch) {
        if let Some(value) = patch.registry {
            self.registry = value;
        }
        if let Some(value) = patch.descriptors {
            self.descriptors = value;
        }
        if let Some(value) = patch.descriptor_extension {
            self.descriptor_extension = value;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub parser: RegistryParserKind,
}

impl RegistryConfig {
    fn merge(&mut self, patch: RegistryPatch) {
        if let Some(value) = patch.parser {
            self.parser = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Team ids that must be present in the registry
    pub required: Vec<String>,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            required: DEFAULT_BASELINE.iter().map(ToString::to_string).collect(),
        }
    }
}

impl BaselineConfig {
    fn merge(&mut self, patch: BaselinePatch) {
        if let Some(values) = patch.required {
            self.required = values;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecksConfig {
    #[serde(default)]
    pub disabled: Vec<String>,
    #[serde(default)]
    pub strict: bool,
    /// Severity overrides keyed by check id
    #[serde(default)]
    pub severity: BTreeMap<String, Severity>,
}

impl ChecksConfig {
    fn merge(&mut self, patch: ChecksPatch) {
        if let Some(values) = patch.disabled {
            self.disabled = merge_unique(values, &self.disabled);
        }
        if let Some(value) = patch.strict {
            self.strict = value;
        }
        if let Some(overrides) = patch.severity {
            self.severity.extend(overrides);
        }
    }
}

/// Report rendering format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    /// JUnit XML, one testcase per check
    Junit,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "junit" | "xml" => Ok(Self::Junit),
            other => Err(format!("unknown output format '{other}' (expected human|json|junit)")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl OutputConfig {
    fn merge(&mut self, patch: OutputPatch) {
        if let Some(value) = patch.format {
            self.format = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    pub paths: Option<PathsPatch>,
    pub registry: Option<RegistryPatch>,
    pub baseline: Option<BaselinePatch>,
    pub checks: Option<ChecksPatch>,
    pub output: Option<OutputPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PathsPatch {
    pub registry: Option<PathBuf>,
    pub descriptors: Option<PathBuf>,
    pub descriptor_extension: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryPatch {
    pub parser: Option<RegistryParserKind>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BaselinePatch {
    pub required: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChecksPatch {
    pub disabled: Option<Vec<String>>,
    pub strict: Option<bool>,
    pub severity: Option<BTreeMap<String, Severity>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputPatch {
    pub format: Option<OutputFormat>,
}

fn merge_unique(values: Vec<String>, existing: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values.into_iter().chain(existing.iter().cloned()) {
        if seen.insert(value.clone()) {
            out.push(value);
        }
    }
    out
}

fn env_bool(env: EnvLookup<'_>, key: &str) -> Result<Option<bool>> {
    let Some(value) = env(key) else {
        return Ok(None);
    };
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
        _ => Err(RosterError::Config(format!(
            "invalid {key} value {value} (expected true|false)"
        ))),
    }
}

fn env_list(env: EnvLookup<'_>, key: &str) -> Option<Vec<String>> {
    env(key).map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}
