use crate::support::{exit_if_rejected, print_json, print_report, report_payload};
use claimcheck_kernel::{AnchorProfile, check_anchors};
use serde_json::json;
use std::fs;

pub fn run(text: String, profile: AnchorProfile, json_output: bool) {
    let content = fs::read_to_string(&text).unwrap_or_else(|error| {
        eprintln!(
            "[ERR] failed to read {text}: {error} (extract it first, e.g. `pdftotext main.pdf {text}`)"
        );
        std::process::exit(1);
    });
    let report = check_anchors(&content, profile);

    if json_output {
        let payload = report_payload(
            &report,
            json!({
                "textPath": text,
                "profile": profile.as_str(),
                "patternCount": profile.patterns().len(),
            }),
        );
        print_json(&payload, "anchor-check");
    } else {
        print_report(
            &report,
            &format!(
                "all {} {profile} anchors present",
                profile.patterns().len()
            ),
        );
    }
    exit_if_rejected(&report);
}
