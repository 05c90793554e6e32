//! `\includegraphics` target resolution.
//!
//! A reference is tried, in order, against the including file's directory,
//! the project root, the configured figure directory and every
//! `\graphicspath` directory. References without a known image extension are
//! tried with each configured extension appended.

use std::path::{Component, Path, PathBuf};

/// Lexically resolve `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Where one reference may live.
#[derive(Debug, Clone, Copy)]
pub struct SearchDirs<'a> {
    pub tex_dir: &'a Path,
    pub root: &'a Path,
    pub figure_dir: &'a Path,
    pub graphics_paths: &'a [PathBuf],
}

impl<'a> SearchDirs<'a> {
    fn bases(&self) -> impl Iterator<Item = &'a Path> {
        [self.tex_dir, self.root, self.figure_dir]
            .into_iter()
            .chain(self.graphics_paths.iter().map(PathBuf::as_path))
    }
}

/// Candidate paths for `raw`, deduplicated, in search order.
pub fn candidate_paths(raw: &str, dirs: &SearchDirs<'_>, extensions: &[String]) -> Vec<PathBuf> {
    let reference = Path::new(raw);
    let has_known_extension = reference
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| extensions.contains(&ext));

    let names: Vec<PathBuf> = if has_known_extension {
        vec![reference.to_path_buf()]
    } else {
        extensions
            .iter()
            .map(|ext| PathBuf::from(format!("{raw}.{ext}")))
            .collect()
    };

    let mut candidates: Vec<PathBuf> = Vec::new();
    for name in &names {
        let joined: Vec<PathBuf> = if name.is_absolute() {
            vec![name.clone()]
        } else {
            dirs.bases().map(|base| base.join(name)).collect()
        };
        for candidate in joined.iter().map(|path| normalize_path(path)) {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// First candidate that exists as a file, plus everything tried.
pub fn resolve_figure(
    raw: &str,
    dirs: &SearchDirs<'_>,
    extensions: &[String],
) -> (Option<PathBuf>, Vec<PathBuf>) {
    let candidates = candidate_paths(raw, dirs, extensions);
    let resolved = candidates.iter().find(|path| path.is_file()).cloned();
    (resolved, candidates)
}
