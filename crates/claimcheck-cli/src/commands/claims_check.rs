use crate::support::{exit_if_rejected, or_exit, print_json, print_report, report_payload};
use claimcheck_ingest::{read_claims, scan_lean_ids};
use claimcheck_kernel::{CheckConfig, check_claims};
use serde_json::json;
use std::path::Path;

pub fn run(claims: String, lean: String, json_output: bool, config: &CheckConfig) {
    let entries = or_exit(read_claims(Path::new(&claims)));
    let declared = or_exit(scan_lean_ids(Path::new(&lean), &config.project));
    let report = check_claims(&entries, &declared);

    if json_output {
        let payload = report_payload(
            &report,
            json!({
                "claimsPath": claims,
                "leanDir": lean,
                "claimCount": entries.len(),
                "declaredIdCount": declared.len(),
            }),
        );
        print_json(&payload, "claims-check");
    } else {
        print_report(
            &report,
            &format!(
                "claims registry consistent ({} entries, {} declared Lean IDs)",
                entries.len(),
                declared.len()
            ),
        );
    }
    exit_if_rejected(&report);
}
