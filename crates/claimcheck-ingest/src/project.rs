//! Whole-project scans: every `.tex` file and every image under a root.

use crate::error::IngestError;
use crate::figures::{SearchDirs, normalize_path, resolve_figure};
use crate::latex::scan_tex;
use crate::walk::{display_relative, files_with_extensions};
use claimcheck_kernel::{FigureRef, LabelUse, ProjectConfig, ProjectScan};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Labels, references and resolved figures across the project. Paths in the
/// result are relative to `root`.
pub fn scan_project(
    root: &Path,
    config: &ProjectConfig,
    extensions: &[String],
) -> Result<ProjectScan, IngestError> {
    let base = normalize_path(root);
    let figure_dir = base.join(&config.figure_dir);
    let tex_files = files_with_extensions(root, &["tex".to_string()], config)?;

    let mut scan = ProjectScan {
        tex_files: tex_files.len(),
        ..ProjectScan::default()
    };
    for tex in &tex_files {
        let bytes = fs::read(tex).map_err(|e| IngestError::io(tex, e))?;
        let facts = scan_tex(&String::from_utf8_lossy(&bytes));
        let tex = normalize_path(tex);
        let file = display_relative(&tex, &base);
        let tex_dir = tex.parent().map(Path::to_path_buf).unwrap_or_default();

        scan.labels.extend(facts.labels);
        scan.refs.extend(facts.refs.into_iter().map(|key| LabelUse {
            file: file.clone(),
            key,
        }));

        let graphics_paths: Vec<PathBuf> = facts
            .graphics_paths
            .iter()
            .map(|dir| normalize_path(&tex_dir.join(dir)))
            .collect();
        let dirs = SearchDirs {
            tex_dir: &tex_dir,
            root: &base,
            figure_dir: &figure_dir,
            graphics_paths: &graphics_paths,
        };
        for raw in facts.graphics {
            let (resolved, tried) = resolve_figure(&raw, &dirs, extensions);
            scan.figures.push(FigureRef {
                file: file.clone(),
                raw,
                resolved: resolved.map(|path| display_relative(&path, &base)),
                tried: tried
                    .iter()
                    .map(|path| display_relative(path, &base))
                    .collect(),
            });
        }
    }

    tracing::debug!(
        root = %root.display(),
        tex_files = scan.tex_files,
        labels = scan.labels.len(),
        figures = scan.figures.len(),
        "project scanned"
    );
    Ok(scan)
}

/// Image files present under `root`, relative to it.
pub fn present_figures(
    root: &Path,
    config: &ProjectConfig,
    extensions: &[String],
) -> Result<BTreeSet<String>, IngestError> {
    let base = normalize_path(root);
    Ok(files_with_extensions(root, extensions, config)?
        .iter()
        .map(|path| display_relative(&normalize_path(path), &base))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    struct TempDirGuard {
        path: PathBuf,
    }

    impl TempDirGuard {
        fn new(prefix: &str) -> Self {
            let unique = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos();
            let path = std::env::temp_dir().join(format!(
                "claimcheck-ingest-{prefix}-{}-{unique}",
                std::process::id()
            ));
            fs::create_dir_all(&path).expect("temp dir should be created");
            Self { path }
        }
    }

    impl Drop for TempDirGuard {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    fn write(root: &Path, rel: &str, contents: &[u8]) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent should be created");
        }
        fs::write(path, contents).expect("file should be written");
    }

    #[test]
    fn scans_tex_and_resolves_figures() {
        let tmp = TempDirGuard::new("scan");
        let root = tmp.path.as_path();
        write(
            root,
            "paper/main.tex",
            br"\label{Psi:main} \ref{Psi:main} \ref{sec:gone}
\graphicspath{{plots/}}
\includegraphics{budget}
\includegraphics{curve.png}
\includegraphics{absent}
",
        );
        write(root, "fig/budget.pdf", b"%PDF");
        write(root, "paper/plots/curve.png", b"png");
        write(root, "fig/unused.png", b"png");
        write(root, "build/skip.tex", br"\ref{never:seen}");
        write(root, "build/skip.png", b"png");

        let config = ProjectConfig::default();
        let extensions = config.normalized_extensions();
        let scan = scan_project(root, &config, &extensions).expect("scan should succeed");

        assert_eq!(scan.tex_files, 1);
        assert!(scan.labels.contains("Psi:main"));
        assert_eq!(
            scan.refs.iter().map(|r| r.key.as_str()).collect::<Vec<_>>(),
            vec!["Psi:main", "sec:gone"]
        );
        assert_eq!(scan.refs[0].file, "paper/main.tex");

        let resolved: Vec<Option<&str>> = scan
            .figures
            .iter()
            .map(|figure| figure.resolved.as_deref())
            .collect();
        assert_eq!(
            resolved,
            vec![Some("fig/budget.pdf"), Some("paper/plots/curve.png"), None]
        );
        assert!(scan.figures[2].tried.contains(&"fig/absent.png".to_string()));

        let present = present_figures(root, &config, &extensions).expect("walk should succeed");
        assert_eq!(
            present.into_iter().collect::<Vec<_>>(),
            vec!["fig/budget.pdf", "fig/unused.png", "paper/plots/curve.png"]
        );
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDirGuard::new("missing");
        let err = scan_project(
            &tmp.path.join("nope"),
            &ProjectConfig::default(),
            &["png".to_string()],
        )
        .expect_err("missing root must fail");
        assert!(matches!(err, IngestError::Walk { .. }));
    }
}
