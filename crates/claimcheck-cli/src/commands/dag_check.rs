use crate::support::{JSON_SCHEMA_VERSION, or_exit, print_findings, print_json};
use claimcheck_ingest::{GraphFormat, load_graph, read_claims};
use claimcheck_kernel::{CheckConfig, GraphReport, GraphValidator, registry_from_claims};
use serde_json::json;
use std::path::Path;

pub struct Args {
    pub graph: String,
    pub claims: String,
    pub strict: bool,
    pub format: GraphFormat,
    pub json: bool,
}

fn print_graph_report(report: &GraphReport) {
    print_findings(&report.check.errors, &report.check.warnings);
    if report.accepted() {
        println!(
            "[OK] DAG acyclic and covered by claims registry (nodes={}, edges={}, strict={})",
            report.summary.node_count, report.summary.edge_count, report.summary.strict
        );
    }
}

pub fn run(args: Args, config: &CheckConfig) {
    let (graph, rows) = or_exit(load_graph(Path::new(&args.graph), args.format));
    let claims = or_exit(read_claims(Path::new(&args.claims)));
    let registry = registry_from_claims(&claims);

    let validator_config = config
        .graph
        .clone()
        .with_strict(config.graph.strict || args.strict);
    let validator = or_exit(GraphValidator::new(&validator_config));
    let report = validator.validate(&graph, &registry, &rows);

    if args.json {
        let payload = json!({
            "schema": JSON_SCHEMA_VERSION,
            "checkKind": report.check.check_kind,
            "graphPath": args.graph,
            "claimsPath": args.claims,
            "result": report.check.result,
            "failureClasses": report.check.failure_classes,
            "warningClasses": report.check.warning_classes,
            "errors": report.check.errors,
            "warnings": report.check.warnings,
            "summary": report.summary,
            "topologicalOrder": report.topological_order,
            "inputDigest": report.input_digest,
        });
        print_json(&payload, "dag-check");
    } else {
        print_graph_report(&report);
    }

    if !report.accepted() {
        std::process::exit(1);
    }
}
