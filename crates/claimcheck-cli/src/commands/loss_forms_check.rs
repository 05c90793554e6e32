use crate::support::{exit_if_rejected, or_exit, print_json, print_report, report_payload};
use claimcheck_ingest::tables::loss_rows;
use claimcheck_ingest::{IngestError, read_csv};
use claimcheck_kernel::loss_form::{LOSS_FORMS_CHECK_KIND, missing_columns_finding};
use claimcheck_kernel::{CheckConfig, CheckReport, check_loss_rows};
use serde_json::json;
use std::path::Path;

pub struct Args {
    pub bridges: Option<String>,
    pub relax: Option<String>,
    pub dag: Option<String>,
    pub json: bool,
}

pub fn run(args: Args, config: &CheckConfig) {
    let rule = or_exit(config.graph.identifier_rule());
    let paths: Vec<String> = [args.bridges, args.relax, args.dag]
        .into_iter()
        .flatten()
        .collect();

    let mut errors = Vec::new();
    let mut clean = Vec::new();
    for path in &paths {
        let table = or_exit(read_csv(Path::new(path)));
        let findings = match loss_rows(&table, path) {
            Ok(rows) => check_loss_rows(path, &rows, &rule),
            Err(IngestError::MissingColumns { missing, .. }) => {
                vec![missing_columns_finding(path, &missing)]
            }
            Err(error) => or_exit(Err(error)),
        };
        if findings.is_empty() {
            clean.push(path.clone());
        }
        errors.extend(findings);
    }
    let report = CheckReport::new(LOSS_FORMS_CHECK_KIND, errors, Vec::new());

    if args.json {
        let payload = report_payload(&report, json!({ "tables": paths, "clean": clean }));
        print_json(&payload, "loss-forms-check");
    } else {
        for path in &clean {
            println!("[OK] {path}");
        }
        print_report(
            &report,
            &format!("{} loss-form tables checked", paths.len()),
        );
    }
    exit_if_rejected(&report);
}
