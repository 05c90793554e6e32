//! LaTeX project rules over an already-scanned project.
//!
//! Scanning (walking `.tex` files, resolving figure candidates on disk) is an
//! ingest concern; this module only judges the collected facts.

use crate::claims::{ClaimEntry, latex_labels};
use crate::config::ProjectConfig;
use crate::report::{CheckReport, Finding};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const PROJECT_CHECK_KIND: &str = "claimcheck.project.check.v1";
pub const ASSET_CHECK_KIND: &str = "claimcheck.assets.check.v1";

pub const FAILURE_CLASS_MISSING_LABEL: &str = "latex.label.missing";
pub const FAILURE_CLASS_UNREGISTERED_THEOREM: &str = "latex.theorem.unregistered";
pub const FAILURE_CLASS_UNDECLARED_LEAN_ID: &str = "latex.lean_id.undeclared";
pub const FAILURE_CLASS_FIGURE_PATH: &str = "latex.figure.noncompliant_path";
pub const FAILURE_CLASS_FIGURE_MISSING: &str = "latex.figure.missing";
pub const WARNING_CLASS_FIGURE_UNUSED: &str = "latex.figure.unused";

const NONCOMPLIANT_FIGURE_SEGMENT: &str = "paper/fig/";

/// A `\ref`-like use of a label key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelUse {
    pub file: String,
    pub key: String,
}

/// One `\includegraphics` occurrence with its resolution outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureRef {
    pub file: String,
    pub raw: String,
    /// First existing candidate, if any.
    pub resolved: Option<String>,
    pub tried: Vec<String>,
}

/// Facts collected from every `.tex` file of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectScan {
    pub tex_files: usize,
    pub labels: BTreeSet<String>,
    pub refs: Vec<LabelUse>,
    pub figures: Vec<FigureRef>,
}

/// Whether a label lives in one of the theorem namespaces, i.e. the part
/// before its first `:` starts with a namespace name.
pub fn is_theorem_label(label: &str, namespaces: &[String]) -> bool {
    let Some((prefix, _)) = label.split_once(':') else {
        return false;
    };
    namespaces
        .iter()
        .any(|namespace| prefix.starts_with(namespace.as_str()))
}

/// Claims-side inputs; the claims-dependent rules are skipped without them.
#[derive(Debug, Clone, Copy)]
pub struct ClaimsContext<'a> {
    pub entries: &'a [ClaimEntry],
    pub declared_lean_ids: Option<&'a BTreeSet<String>>,
}

pub fn check_project(
    scan: &ProjectScan,
    claims: Option<ClaimsContext<'_>>,
    config: &ProjectConfig,
) -> CheckReport {
    let mut errors = Vec::new();

    let mut missing: BTreeMap<&str, &str> = BTreeMap::new();
    for use_site in &scan.refs {
        if !scan.labels.contains(&use_site.key) {
            missing
                .entry(use_site.key.as_str())
                .or_insert(use_site.file.as_str());
        }
    }
    for (key, file) in missing {
        errors.push(Finding::new(
            key,
            FAILURE_CLASS_MISSING_LABEL,
            format!("missing LaTeX label for ref {key} (first used in {file})"),
        ));
    }

    if let Some(claims) = claims {
        let registered = latex_labels(claims.entries);
        for label in scan
            .labels
            .iter()
            .filter(|label| is_theorem_label(label, &config.theorem_namespaces))
            .filter(|label| !registered.contains(*label))
        {
            errors.push(Finding::new(
                label.clone(),
                FAILURE_CLASS_UNREGISTERED_THEOREM,
                format!("theorem label missing in claims registry: {label}"),
            ));
        }

        if let Some(declared) = claims.declared_lean_ids {
            let lean_ids: BTreeSet<&str> = claims
                .entries
                .iter()
                .map(|entry| entry.lean.as_str())
                .collect();
            for id in lean_ids.into_iter().filter(|id| !declared.contains(*id)) {
                errors.push(Finding::new(
                    id,
                    FAILURE_CLASS_UNDECLARED_LEAN_ID,
                    format!("Lean ID in claims registry has no `-- ID:` header: {id}"),
                ));
            }
        }
    }

    for figure in &scan.figures {
        if figure.raw.contains(NONCOMPLIANT_FIGURE_SEGMENT) {
            errors.push(Finding::new(
                figure.raw.clone(),
                FAILURE_CLASS_FIGURE_PATH,
                format!(
                    "non-compliant figure path (should use {}/): {} : {{ {} }}",
                    config.figure_dir, figure.file, figure.raw
                ),
            ));
        }
    }
    errors.extend(missing_figure_findings(&scan.figures));

    tracing::info!(
        tex_files = scan.tex_files,
        labels = scan.labels.len(),
        refs = scan.refs.len(),
        figures = scan.figures.len(),
        errors = errors.len(),
        "project checked"
    );
    CheckReport::new(PROJECT_CHECK_KIND, errors, Vec::new())
}

fn missing_figure_findings(figures: &[FigureRef]) -> Vec<Finding> {
    figures
        .iter()
        .filter(|figure| figure.resolved.is_none())
        .map(|figure| {
            let tried = if figure.tried.is_empty() {
                String::new()
            } else {
                format!(" (tried: {})", figure.tried.join(", "))
            };
            Finding::new(
                figure.raw.clone(),
                FAILURE_CLASS_FIGURE_MISSING,
                format!(
                    "referenced figure not found: {} : {{ {} }}{tried}",
                    figure.file, figure.raw
                ),
            )
        })
        .collect()
}

/// Missing figures fail the check; present-but-unused images are warnings.
pub fn check_assets(figures: &[FigureRef], present: &BTreeSet<String>) -> CheckReport {
    let errors = missing_figure_findings(figures);
    let used: BTreeSet<&str> = figures
        .iter()
        .filter_map(|figure| figure.resolved.as_deref())
        .collect();
    let warnings = present
        .iter()
        .filter(|path| !used.contains(path.as_str()))
        .map(|path| {
            Finding::new(
                path.clone(),
                WARNING_CLASS_FIGURE_UNUSED,
                format!("present but unused: {path}"),
            )
        })
        .collect::<Vec<_>>();
    tracing::info!(
        figures = figures.len(),
        present = present.len(),
        missing = errors.len(),
        unused = warnings.len(),
        "assets checked"
    );
    CheckReport::new(ASSET_CHECK_KIND, errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn use_site(file: &str, key: &str) -> LabelUse {
        LabelUse {
            file: file.to_string(),
            key: key.to_string(),
        }
    }

    fn figure(raw: &str, resolved: Option<&str>) -> FigureRef {
        FigureRef {
            file: "main.tex".to_string(),
            raw: raw.to_string(),
            resolved: resolved.map(str::to_string),
            tried: Vec::new(),
        }
    }

    fn scan() -> ProjectScan {
        ProjectScan {
            tex_files: 2,
            labels: ["Psi:thm:main", "Budget-ext:lem:b", "sec:intro", "Lk:lem:aux"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            refs: vec![
                use_site("main.tex", "sec:intro"),
                use_site("main.tex", "sec:missing"),
                use_site("appendix.tex", "sec:missing"),
            ],
            figures: vec![figure("fig/a.png", Some("fig/a.png"))],
        }
    }

    #[test]
    fn theorem_namespace_matches_prefix_before_colon() {
        let namespaces = ProjectConfig::default().theorem_namespaces;
        assert!(is_theorem_label("Psi:thm:main", &namespaces));
        assert!(is_theorem_label("Budget-ext:lem:b", &namespaces));
        assert!(!is_theorem_label("sec:Psi", &namespaces));
        assert!(!is_theorem_label("Psi", &namespaces));
    }

    #[test]
    fn missing_label_reported_once_per_key() {
        let report = check_project(&scan(), None, &ProjectConfig::default());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].subject, "sec:missing");
        assert!(report.errors[0].message.contains("main.tex"));
    }

    #[test]
    fn claims_rules_apply_when_registry_given() {
        let entries = vec![
            ClaimEntry::new("Psi:thm:main", "Psi.Main"),
            ClaimEntry::new("Lk:lem:aux", "Lk.Aux"),
        ];
        let declared: BTreeSet<String> = ["Psi.Main".to_string()].into_iter().collect();
        let report = check_project(
            &scan(),
            Some(ClaimsContext {
                entries: &entries,
                declared_lean_ids: Some(&declared),
            }),
            &ProjectConfig::default(),
        );
        assert_eq!(
            report.failure_classes,
            vec![
                FAILURE_CLASS_MISSING_LABEL,
                FAILURE_CLASS_UNDECLARED_LEAN_ID,
                FAILURE_CLASS_UNREGISTERED_THEOREM,
            ]
        );
        let subjects = report
            .errors
            .iter()
            .map(|f| f.subject.as_str())
            .collect::<Vec<_>>();
        assert_eq!(subjects, vec!["sec:missing", "Budget-ext:lem:b", "Lk.Aux"]);
    }

    #[test]
    fn figures_noncompliant_and_missing() {
        let scan = ProjectScan {
            figures: vec![
                figure("paper/fig/plot.pdf", Some("paper/fig/plot.pdf")),
                figure("fig/none", None),
            ],
            ..ProjectScan::default()
        };
        let report = check_project(&scan, None, &ProjectConfig::default());
        assert_eq!(
            report.failure_classes,
            vec![FAILURE_CLASS_FIGURE_MISSING, FAILURE_CLASS_FIGURE_PATH]
        );
    }

    #[test]
    fn unused_assets_only_warn() {
        let present: BTreeSet<String> = ["fig/a.png", "fig/old.png"]
            .into_iter()
            .map(str::to_string)
            .collect();
        let report = check_assets(&[figure("fig/a", Some("fig/a.png"))], &present);
        assert!(report.accepted());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].subject, "fig/old.png");

        let report = check_assets(&[figure("fig/gone", None)], &present);
        assert!(!report.accepted());
        assert_eq!(report.warnings.len(), 2);
    }
}
