use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::ScourError;
use crate::pattern::PatternSet;

/// Marker file that identifies a project root.
pub const DEFAULT_MARKER: &str = "pyproject.toml";

/// Dependency-environment directory that is only removed on request.
pub const DEFAULT_PROTECTED_DIR: &str = ".venv";

/// Build-artifact directory names removed at any depth.
pub const DEFAULT_DIRS: &[&str] = &[
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    ".hypothesis",
    ".tox",
    ".nox",
    "build",
    "dist",
    "wheels",
    "htmlcov",
    "*.egg-info",
];

/// Generated file names removed at any depth.
pub const DEFAULT_FILES: &[&str] = &[
    "*.pyc",
    "*.pyo",
    "*.pyd",
    ".coverage",
    "coverage.xml",
    "*.cover",
    "*.py,cover",
];

/// Local developer configuration that is never removed.
pub const DEFAULT_PRESERVE: &[&str] = &[
    ".env",
    ".env.*",
    ".envrc",
    ".python-version",
    ".tool-versions",
    ".editorconfig",
    ".vscode",
    ".idea",
    "*.local",
    "*.local.*",
];

/// Compiled matching rules for one run.
///
/// `marker` and `protected_dir` are always a single path component, so
/// joining either onto the root never leaves it.
#[derive(Debug, Clone)]
pub struct Rules {
    marker: String,
    protected_dir: String,
    pub dirs: PatternSet,
    pub files: PatternSet,
    pub preserve: PatternSet,
}

impl Rules {
    pub fn new<S: AsRef<str>>(
        marker: &str,
        protected_dir: &str,
        dirs: &[S],
        files: &[S],
        preserve: &[S],
    ) -> Result<Self, ScourError> {
        Ok(Self {
            marker: single_name("marker", marker)?,
            protected_dir: single_name("protected_dir", protected_dir)?,
            dirs: PatternSet::parse(dirs)?,
            files: PatternSet::parse(files)?,
            preserve: PatternSet::parse(preserve)?,
        })
    }

    /// File name whose presence marks a project root.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Directory name skipped unless protected removal is requested.
    pub fn protected_dir(&self) -> &str {
        &self.protected_dir
    }

    /// True if `name` matches any preservation pattern.
    pub fn is_preserved(&self, name: &str) -> bool {
        self.preserve.matches(name)
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            protected_dir: DEFAULT_PROTECTED_DIR.to_string(),
            dirs: PatternSet::from_static(DEFAULT_DIRS),
            files: PatternSet::from_static(DEFAULT_FILES),
            preserve: PatternSet::from_static(DEFAULT_PRESERVE),
        }
    }
}

/// Accept `value` only if it is exactly one normal path component.
/// Rejects empty strings, `.`, `..`, absolute paths and anything with a
/// separator.
fn single_name(field: &'static str, value: &str) -> Result<String, ScourError> {
    let components: Vec<Component<'_>> = Path::new(value).components().collect();
    match components.as_slice() {
        [Component::Normal(name)] if *name == OsStr::new(value) => Ok(value.to_string()),
        _ => Err(ScourError::InvalidName {
            field,
            value: value.to_string(),
        }),
    }
}

/// Walk upward from `start` to the first directory containing `marker`.
///
/// When no ancestor has the marker the root is `start` itself, the
/// directory the search began from. Nothing above or beside `start` is
/// ever picked as a fallback, so an unmarked tree is only cleaned from
/// where the user invoked the tool.
pub fn find_project_root(start: &Path, marker: &str) -> PathBuf {
    for dir in start.ancestors() {
        if dir.join(marker).is_file() {
            tracing::debug!(root = %dir.display(), marker, "found project marker");
            return dir.to_path_buf();
        }
    }
    tracing::debug!(
        start = %start.display(),
        marker,
        "no project marker found, using start directory"
    );
    start.to_path_buf()
}
