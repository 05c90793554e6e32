use crate::support::{exit_if_rejected, or_exit, print_json, print_report, report_payload};
use claimcheck_ingest::{present_figures, scan_project};
use claimcheck_kernel::config::normalize_extensions;
use claimcheck_kernel::{CheckConfig, check_assets};
use serde_json::json;
use std::path::Path;

pub fn run(root: String, ext: Option<String>, json_output: bool, config: &CheckConfig) {
    let root_path = Path::new(&root);
    if !root_path.exists() {
        eprintln!("[ERR] root path does not exist: {root}");
        std::process::exit(1);
    }
    let mut extensions = ext
        .as_deref()
        .map(|raw| normalize_extensions(raw.split(',')))
        .unwrap_or_default();
    if extensions.is_empty() {
        extensions = config.project.normalized_extensions();
    }

    let scan = or_exit(scan_project(root_path, &config.project, &extensions));
    let present = or_exit(present_figures(root_path, &config.project, &extensions));
    let report = check_assets(&scan.figures, &present);

    if json_output {
        let payload = report_payload(
            &report,
            json!({
                "root": root,
                "extensions": extensions,
                "texFiles": scan.tex_files,
                "referencedCount": scan.figures.len(),
                "presentCount": present.len(),
                "missing": report.errors.iter().map(|f| &f.subject).collect::<Vec<_>>(),
                "unused": report.warnings.iter().map(|f| &f.subject).collect::<Vec<_>>(),
            }),
        );
        print_json(&payload, "asset-check");
    } else {
        print_report(
            &report,
            &format!(
                "all {} referenced figures resolved ({} unused)",
                scan.figures.len(),
                report.warnings.len()
            ),
        );
    }
    exit_if_rejected(&report);
}
