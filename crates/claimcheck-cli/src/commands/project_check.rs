use crate::support::{exit_if_rejected, or_exit, print_json, print_report, report_payload};
use claimcheck_ingest::{read_claims, scan_lean_ids, scan_project};
use claimcheck_kernel::{CheckConfig, ClaimsContext, check_project};
use serde_json::json;
use std::path::Path;

pub fn run(
    root: String,
    claims: Option<String>,
    lean: Option<String>,
    json_output: bool,
    config: &CheckConfig,
) {
    let extensions = config.project.normalized_extensions();
    let scan = or_exit(scan_project(Path::new(&root), &config.project, &extensions));
    if claims.is_none() {
        tracing::warn!("no --claims given; theorem-label coverage and Lean ID checks are skipped");
    }
    let entries = claims
        .as_deref()
        .map(|path| or_exit(read_claims(Path::new(path))));
    let declared = match (&entries, lean.as_deref()) {
        (Some(_), Some(dir)) => Some(or_exit(scan_lean_ids(Path::new(dir), &config.project))),
        (None, Some(_)) => {
            tracing::warn!("--lean has no effect without --claims");
            None
        }
        _ => None,
    };
    let context = entries.as_deref().map(|entries| ClaimsContext {
        entries,
        declared_lean_ids: declared.as_ref(),
    });
    let report = check_project(&scan, context, &config.project);

    if json_output {
        let payload = report_payload(
            &report,
            json!({
                "root": root,
                "texFiles": scan.tex_files,
                "labelCount": scan.labels.len(),
                "refCount": scan.refs.len(),
                "figureCount": scan.figures.len(),
            }),
        );
        print_json(&payload, "project-check");
    } else {
        print_report(
            &report,
            &format!("project checks passed ({} tex files)", scan.tex_files),
        );
    }
    exit_if_rejected(&report);
}
