use std::io;
use std::path::PathBuf;

/// Errors produced by core `scour` operations.
#[derive(Debug, thiserror::Error)]
pub enum ScourError {
    #[error("permission denied: {}: {source}", .path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid pattern {0:?}: pattern must not be empty")]
    InvalidPattern(String),

    #[error("invalid {field} {value:?}: must be a single file or directory name")]
    InvalidName { field: &'static str, value: String },
}

impl ScourError {
    /// Classify an I/O failure on `path` into one of the two per-candidate kinds.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::PermissionDenied {
            ScourError::PermissionDenied { path, source }
        } else {
            ScourError::Filesystem { path, source }
        }
    }
}
