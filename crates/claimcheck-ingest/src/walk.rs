//! Directory walking with the configured ignored directories pruned.

use crate::error::IngestError;
use claimcheck_kernel::ProjectConfig;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn is_pruned(entry: &DirEntry, config: &ProjectConfig) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && config.is_ignored(Path::new(entry.file_name()))
}

/// Whether `path` has one of `extensions` (lowercase, no dot).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| extensions.iter().any(|wanted| *wanted == ext))
}

/// Regular files under `root` with one of `extensions`, sorted by path.
pub fn files_with_extensions(
    root: &Path,
    extensions: &[String],
    config: &ProjectConfig,
) -> Result<Vec<PathBuf>, IngestError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry, config))
    {
        let entry = entry.map_err(|e| IngestError::Walk {
            path: root.display().to_string(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// `path` relative to `root` with `/` separators, for stable diagnostics.
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
