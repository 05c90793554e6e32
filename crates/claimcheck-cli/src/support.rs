use claimcheck_kernel::{CheckConfig, CheckReport, Finding};
use serde_json::{Value, json};
use std::fmt::Display;
use std::path::Path;

pub const JSON_SCHEMA_VERSION: u64 = 1;

/// Unwrap a load result or report the error and exit 1.
pub fn or_exit<T, E: Display>(result: Result<T, E>) -> T {
    result.unwrap_or_else(|error| {
        eprintln!("[ERR] {error}");
        std::process::exit(1);
    })
}

pub fn load_config_or_exit(path: Option<&str>) -> CheckConfig {
    or_exit(CheckConfig::load(path.map(Path::new)))
}

pub fn print_findings(errors: &[Finding], warnings: &[Finding]) {
    for finding in errors {
        println!("[ERR] {}", finding.message);
    }
    for finding in warnings {
        println!("[WARN] {}", finding.message);
    }
}

/// Findings first, then one `[OK]` line when the report was accepted.
pub fn print_report(report: &CheckReport, ok_line: &str) {
    print_findings(&report.errors, &report.warnings);
    if report.accepted() {
        println!("[OK] {ok_line}");
    }
}

/// The common JSON envelope; `extra` object fields are merged in.
pub fn report_payload(report: &CheckReport, extra: Value) -> Value {
    let mut payload = json!({
        "schema": JSON_SCHEMA_VERSION,
        "checkKind": report.check_kind,
        "result": report.result,
        "failureClasses": report.failure_classes,
        "warningClasses": report.warning_classes,
        "errors": report.errors,
        "warnings": report.warnings,
    });
    if let (Some(target), Value::Object(fields)) = (payload.as_object_mut(), extra) {
        target.extend(fields);
    }
    payload
}

pub fn print_json(payload: &Value, command: &str) {
    let rendered = or_exit(
        serde_json::to_string_pretty(payload)
            .map_err(|error| format!("failed to render {command} payload: {error}")),
    );
    println!("{rendered}");
}

pub fn exit_if_rejected(report: &CheckReport) {
    if !report.accepted() {
        std::process::exit(1);
    }
}
