use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::detect::{
    Rules, DEFAULT_DIRS, DEFAULT_FILES, DEFAULT_MARKER, DEFAULT_PRESERVE, DEFAULT_PROTECTED_DIR,
};
use crate::error::ScourError;

/// User configuration loaded from `~/.config/scour/config.toml`.
///
/// All fields have sensible defaults so the config file is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub marker: String,
    pub protected_dir: String,
    pub dirs: Vec<String>,
    pub files: Vec<String>,
    pub preserve: Vec<String>,
    /// Appended to `preserve` so the defaults can be extended without restating them.
    pub extra_preserve: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            protected_dir: DEFAULT_PROTECTED_DIR.to_string(),
            dirs: owned(DEFAULT_DIRS),
            files: owned(DEFAULT_FILES),
            preserve: owned(DEFAULT_PRESERVE),
            extra_preserve: Vec::new(),
        }
    }
}

impl Config {
    /// Load from an explicit file, or from the user config dir if present,
    /// or fall back to the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ScourError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ScourError::ConfigNotFound(path.to_path_buf()));
            }
            return Self::load_from(path);
        }
        match Self::config_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ScourError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScourError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ScourError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "scour").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Compile the pattern lists into matching rules.
    ///
    /// Fails if `marker` or `protected_dir` is not a plain name, or if any
    /// pattern is empty.
    pub fn rules(&self) -> Result<Rules, ScourError> {
        let preserve: Vec<&str> = self.preserved_patterns().collect();
        let dirs: Vec<&str> = self.dirs.iter().map(String::as_str).collect();
        let files: Vec<&str> = self.files.iter().map(String::as_str).collect();
        Rules::new(&self.marker, &self.protected_dir, &dirs, &files, &preserve)
    }

    /// Every effective preservation pattern, in order.
    pub fn preserved_patterns(&self) -> impl Iterator<Item = &str> {
        self.preserve
            .iter()
            .chain(&self.extra_preserve)
            .map(String::as_str)
    }
}
