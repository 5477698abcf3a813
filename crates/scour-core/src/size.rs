use std::path::Path;

use walkdir::WalkDir;

const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

/// Format a byte count with one decimal place in the largest unit that
/// keeps the value below 1024 (`TB` is the ceiling).
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}

/// Total size of the regular files below `path`. Symlinks are not followed
/// and unreadable entries count as zero.
pub fn dir_size(path: &Path) -> u64 {
    let mut size = 0u64;
    for entry in WalkDir::new(path).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() {
            size += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    size
}

/// Size of a single file, zero if its metadata cannot be read.
pub fn file_size(path: &Path) -> u64 {
    match std::fs::symlink_metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read file size");
            0
        }
    }
}
