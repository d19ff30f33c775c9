use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::team::{InputPaths, RegistryBackend, RegistryParserKind, Snapshot};

/// Registry location relative to the fixture root.
pub const REGISTRY_PATH: &str = "teams/registry.json";
/// Descriptor directory relative to the fixture root.
pub const DESCRIPTOR_DIR: &str = "teams";

/// Throwaway project directory with a team registry and descriptors.
///
/// Uses the default layout (`teams/registry.json`, `teams/<id>.conf`).
pub struct TeamFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl Default for TeamFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamFixture {
    /// Fixture with an empty descriptor directory and no registry.
    #[must_use]
    pub fn new() -> Self {
        let fixture = Self::empty();
        std::fs::create_dir_all(fixture.root.join(DESCRIPTOR_DIR))
            .expect("Failed to create descriptor dir");
        fixture
    }

    /// Fixture with nothing in it.
    #[must_use]
    pub fn empty() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        println!("[FIXTURE] Created temp directory: {root:?}");
        Self { temp_dir, root }
    }

    /// Fixture whose registry lists `ids` and which has a complete
    /// descriptor for each of them.
    #[must_use]
    pub fn consistent(ids: &[&str]) -> Self {
        let fixture = Self::new();
        fixture.write_registry_ids(ids);
        for id in ids {
            fixture.write_team(id);
        }
        fixture
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn descriptor_dir(&self) -> PathBuf {
        self.root.join(DESCRIPTOR_DIR)
    }

    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(REGISTRY_PATH)
    }

    /// Input paths for the default layout.
    #[must_use]
    pub fn input_paths(&self) -> InputPaths {
        InputPaths {
            registry: self.registry_path(),
            descriptors: self.descriptor_dir(),
            extension: "conf".to_string(),
        }
    }

    /// Load a snapshot with the JSON backend.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::load(
            &self.input_paths(),
            &RegistryBackend::detect(RegistryParserKind::Json),
        )
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        println!(
            "[FIXTURE] Created file: {:?} ({} bytes)",
            full_path,
            content.len()
        );
        full_path
    }

    /// Write a file into the descriptor directory under `file_name`.
    pub fn write_descriptor_file(&self, file_name: &str, content: &str) -> PathBuf {
        self.write_file(&format!("{DESCRIPTOR_DIR}/{file_name}"), content)
    }

    /// Write `<id>.conf` with the given fields.
    pub fn write_descriptor(
        &self,
        id: &str,
        name: &str,
        description: &str,
        agents: &[&str],
    ) -> PathBuf {
        self.write_descriptor_file(&format!("{id}.conf"), &descriptor_source(id, name, description, agents))
    }

    /// Write a complete descriptor for `id`.
    pub fn write_team(&self, id: &str) -> PathBuf {
        self.write_descriptor(
            id,
            &format!("{id} team"),
            &format!("Owns the {id} surface"),
            &["lead", "reviewer"],
        )
    }

    pub fn write_registry(&self, content: &str) -> PathBuf {
        self.write_file(REGISTRY_PATH, content)
    }

    /// Write a well-formed registry listing `ids` in order.
    pub fn write_registry_ids(&self, ids: &[&str]) -> PathBuf {
        let teams: Vec<_> = ids
            .iter()
            .map(|id| serde_json::json!({ "id": id, "name": format!("{id} team") }))
            .collect();
        let document = serde_json::json!({ "version": "1.0", "teams": teams });
        let raw = serde_json::to_string_pretty(&document).expect("Failed to encode registry");
        self.write_registry(&raw)
    }

    /// Write the project config file `roster.toml`.
    pub fn write_config(&self, content: &str) -> PathBuf {
        self.write_file("roster.toml", content)
    }

    pub fn remove(&self, relative_path: &str) {
        let path = self.root.join(relative_path);
        if path.is_dir() {
            std::fs::remove_dir_all(&path).expect("Failed to remove dir");
        } else {
            std::fs::remove_file(&path).expect("Failed to remove file");
        }
    }
}

impl Drop for TeamFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up temp directory: {:?}", self.root);
    }
}

/// Render a descriptor file body.
#[must_use]
pub fn descriptor_source(id: &str, name: &str, description: &str, agents: &[&str]) -> String {
    let agents = agents
        .iter()
        .map(|agent| format!("\"{agent}\""))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "# Team descriptor\nTEAM_ID={id}\nTEAM_NAME=\"{name}\"\nTEAM_DESCRIPTION=\"{description}\"\nTEAM_AGENTS=({agents})\n"
    )
}
