use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{Config, OutputFormat, PROJECT_CONFIG_FILE};
use crate::error::{Result, RosterError};
use crate::team::InputPaths;

pub struct AppContext {
    /// Project root; relative config paths resolve against it
    pub root: PathBuf,
    /// Config file that defines this project, when one exists
    pub config_path: Option<PathBuf>,
    pub config: Config,
    pub output_format: OutputFormat,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = Self::find_root(cli.root.as_deref())?;
        let config = Config::load(cli.config.as_deref(), &root)?;
        let config_path = cli
            .config
            .clone()
            .or_else(|| std::env::var_os("ROSTER_CONFIG").map(PathBuf::from))
            .or_else(|| {
                let project = root.join(PROJECT_CONFIG_FILE);
                project.is_file().then_some(project)
            });

        Ok(Self {
            output_format: cli.output_format(config.output.format),
            root,
            config_path,
            config,
        })
    }

    /// Build a context directly, bypassing CLI parsing.
    #[must_use]
    pub fn with_config(root: PathBuf, config: Config) -> Self {
        Self {
            output_format: config.output.format,
            root,
            config_path: None,
            config,
        }
    }

    /// Registry and descriptor locations for this project.
    #[must_use]
    pub fn input_paths(&self) -> InputPaths {
        self.config.input_paths(&self.root)
    }

    /// `--root`, then `ROSTER_ROOT`, then the nearest ancestor holding
    /// `roster.toml`, then the working directory.
    fn find_root(explicit: Option<&Path>) -> Result<PathBuf> {
        let explicit = explicit
            .map(PathBuf::from)
            .or_else(|| std::env::var("ROSTER_ROOT").ok().map(PathBuf::from));
        if let Some(root) = explicit {
            if !root.is_dir() {
                return Err(RosterError::NotFound(format!(
                    "project root {} is not a directory",
                    root.display()
                )));
            }
            return Ok(root);
        }

        let cwd = std::env::current_dir()?;
        Ok(find_upwards(&cwd, PROJECT_CONFIG_FILE).unwrap_or(cwd))
    }
}

/// Nearest directory at or above `start` that contains a file named `name`.
fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(name).is_file())
        .map(Path::to_path_buf)
}
