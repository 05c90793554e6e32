//! # claimcheck-ingest
//!
//! Boundary parsers for everything the checks read from disk.
//!
//! This crate turns files into the plain data the kernel judges:
//! - DOT-like graph text and CSV edge tables → `Graph` + `EdgeRow`s
//! - claims YAML → `ClaimEntry` list
//! - Lean sources → declared identifier set
//! - LaTeX sources → `ProjectScan` (labels, refs, resolved figures)
//!
//! Malformed input is an [`IngestError`]; nothing here produces findings.

pub mod claims;
pub mod csv;
pub mod dot;
pub mod error;
pub mod figures;
pub mod latex;
pub mod latex_table;
pub mod lean;
pub mod project;
pub mod tables;
pub mod walk;

pub use claims::{parse_claims, read_claims};
pub use csv::{CsvError, CsvRecord, CsvTable};
pub use dot::{DotError, parse_dot};
pub use error::IngestError;
pub use latex::{TexFacts, scan_tex, strip_comments};
pub use latex_table::{DEFAULT_CAPTION, render_latex_table};
pub use lean::scan_lean_ids;
pub use project::{present_figures, scan_project};
pub use tables::{read_csv, read_edge_table, read_loss_table};

use claimcheck_kernel::{EdgeRow, Graph};
use std::fs;
use std::path::Path;

/// Graph source syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphFormat {
    /// `.csv` files are edge tables, everything else is DOT.
    #[default]
    Auto,
    Dot,
    Csv,
}

impl GraphFormat {
    pub fn resolve(self, path: &Path) -> GraphFormat {
        match self {
            GraphFormat::Auto => {
                let is_csv = path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
                if is_csv {
                    GraphFormat::Csv
                } else {
                    GraphFormat::Dot
                }
            }
            explicit => explicit,
        }
    }
}

/// Load a dependency graph. DOT sources carry no rows.
pub fn load_graph(path: &Path, format: GraphFormat) -> Result<(Graph, Vec<EdgeRow>), IngestError> {
    match format.resolve(path) {
        GraphFormat::Csv => read_edge_table(path),
        _ => {
            let text = fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
            let graph = parse_dot(&text).map_err(|source| IngestError::Dot {
                path: path.display().to_string(),
                source,
            })?;
            tracing::debug!(
                path = %path.display(),
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "dot graph loaded"
            );
            Ok((graph, Vec::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_format_uses_extension() {
        assert_eq!(
            GraphFormat::Auto.resolve(Path::new("deps.CSV")),
            GraphFormat::Csv
        );
        assert_eq!(
            GraphFormat::Auto.resolve(Path::new("deps.dot")),
            GraphFormat::Dot
        );
        assert_eq!(
            GraphFormat::Dot.resolve(Path::new("deps.csv")),
            GraphFormat::Dot
        );
    }

    #[test]
    fn missing_graph_file_is_io_error() {
        let err = load_graph(Path::new("/nonexistent/claimcheck/deps.dot"), GraphFormat::Auto)
            .expect_err("missing file must fail");
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
