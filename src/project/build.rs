use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The fields of the IDE's `build.bff` descriptor that matter here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub project_name: String,
    pub config: String,
    pub project_dir: PathBuf,
    pub preferences: PathBuf,
}

impl BuildInfo {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let info: BuildInfo = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if info.project_name.is_empty() {
            return Err(ConfigError::InvalidBuild("empty projectName".to_string()));
        }
        Ok(info)
    }

    /// Project subdirectory with hand-written native files.
    pub fn source_dir(&self, cpp_dir: &str) -> PathBuf {
        self.project_dir.join(cpp_dir)
    }

    /// Build-cache directory holding the generated files.
    pub fn scripts_dir(&self) -> PathBuf {
        let cache = self
            .preferences
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        cache
            .join(&self.project_name)
            .join(&self.config)
            .join("Scripts")
    }
}
