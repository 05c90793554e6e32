use crate::support::{exit_if_rejected, or_exit, print_json, print_report, report_payload};
use claimcheck_ingest::{read_claims, read_loss_table};
use claimcheck_kernel::{CheckConfig, check_bridges, registry_from_claims};
use serde_json::json;
use std::path::Path;

pub fn run(csv: String, claims: String, json_output: bool, config: &CheckConfig) {
    let entries = or_exit(read_claims(Path::new(&claims)));
    let rows = or_exit(read_loss_table(Path::new(&csv)));
    let report = check_bridges(&rows, &registry_from_claims(&entries), &config.bridges);

    if json_output {
        let payload = report_payload(
            &report,
            json!({
                "csvPath": csv,
                "claimsPath": claims,
                "bridgeIds": config.bridges.ids(),
                "rowCount": rows.len(),
            }),
        );
        print_json(&payload, "bridges-check");
    } else {
        print_report(
            &report,
            &format!("bridge loss forms parse and compose ({csv})"),
        );
    }
    exit_if_rejected(&report);
}
