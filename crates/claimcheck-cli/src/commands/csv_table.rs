use crate::support::or_exit;
use claimcheck_ingest::{read_csv, render_latex_table};
use std::fs;
use std::path::Path;

pub fn run(csv: String, out: String, caption: String) {
    let table = or_exit(read_csv(Path::new(&csv)));
    let rendered = render_latex_table(&table, &caption);
    fs::write(&out, rendered).unwrap_or_else(|error| {
        eprintln!("[ERR] failed to write {out}: {error}");
        std::process::exit(1);
    });
    tracing::info!(rows = table.len(), out = %out, "latex table written");
    println!("[OK] wrote {out} from {csv}");
}
