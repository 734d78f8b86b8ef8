// Workspace layout
//
// A workspace root holds everything the remixer touches on disk:
//   config/parameters.json   filter catalog + randomization config
//   config/preferences.json  user-editable processing preferences
//   config/generated/        one JSON descriptor per job
//   uploads/                 source videos
//   outputs/                 rendered results, named by job id
//   logs/                    append-only run logs

use std::path::{Path, PathBuf};

use crate::catalog::FilterCatalog;
use crate::constants::{
    CATALOG_FILENAME, CONFIG_FOLDER, GENERATED_FOLDER, LOGS_FOLDER, OUTPUTS_FOLDER,
    OUTPUT_FILE_EXT, OUTPUT_FILE_PREFIX, PREFERENCES_FILENAME, UPLOADS_FOLDER,
};
use crate::error::Result;
use crate::preferences::Preferences;

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join(CONFIG_FOLDER)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.config_dir().join(CATALOG_FILENAME)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.config_dir().join(PREFERENCES_FILENAME)
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.config_dir().join(GENERATED_FOLDER)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(UPLOADS_FOLDER)
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.root.join(OUTPUTS_FOLDER)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_FOLDER)
    }

    /// Descriptor file for a job id
    pub fn descriptor_path(&self, job_id: &str) -> PathBuf {
        self.generated_dir().join(format!("{}.json", job_id))
    }

    /// Output file for a job id. Derived deterministically so a descriptor
    /// and its output can always be matched up after the fact.
    pub fn output_path(&self, job_id: &str) -> PathBuf {
        self.outputs_dir().join(format!(
            "{}{}.{}",
            OUTPUT_FILE_PREFIX, job_id, OUTPUT_FILE_EXT
        ))
    }

    /// Create the folder structure and write default config files when
    /// they do not exist yet.
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(self.config_dir())?;
        std::fs::create_dir_all(self.generated_dir())?;
        std::fs::create_dir_all(self.uploads_dir())?;
        std::fs::create_dir_all(self.outputs_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;

        if !self.catalog_path().exists() {
            let catalog = FilterCatalog::default();
            std::fs::write(
                self.catalog_path(),
                serde_json::to_string_pretty(&catalog)
                    .map_err(|e| crate::error::RemixError::Other(e.to_string()))?,
            )?;
        }

        if !self.preferences_path().exists() {
            let prefs = Preferences::default();
            std::fs::write(
                self.preferences_path(),
                serde_json::to_string_pretty(&prefs)
                    .map_err(|e| crate::error::RemixError::Other(e.to_string()))?,
            )?;
        }

        Ok(())
    }
}
