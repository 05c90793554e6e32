//! Fixed-field rows built from CSV tables.
//!
//! Required columns and required cells are checked here, once, so the
//! kernel only ever sees well-formed rows.

use crate::csv::CsvTable;
use crate::error::IngestError;
use claimcheck_kernel::{EdgeRow, Graph, LossRow};
use std::fs;
use std::path::Path;

pub const COLUMN_FROM: &str = "From";
pub const COLUMN_TO: &str = "To";
pub const COLUMN_REFERENCE: &str = "ReferenceLemma";
pub const COLUMN_LOSS_FORM: &str = "LossForm";
pub const COLUMN_PARAMETERS: &str = "Parameters";

pub const LOSS_TABLE_COLUMNS: [&str; 3] = [COLUMN_LOSS_FORM, COLUMN_PARAMETERS, COLUMN_REFERENCE];

/// Read and parse a CSV file.
pub fn read_csv(path: &Path) -> Result<CsvTable, IngestError> {
    let text = fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
    CsvTable::parse(&text).map_err(|source| IngestError::Csv {
        path: path.display().to_string(),
        source,
    })
}

/// Edge rows from a table with `From`/`To` and an optional reference column.
pub fn edge_rows(table: &CsvTable, path: &str) -> Result<(Graph, Vec<EdgeRow>), IngestError> {
    let missing = table.missing_columns(&[COLUMN_FROM, COLUMN_TO]);
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns {
            path: path.to_string(),
            missing,
        });
    }

    let mut graph = Graph::new();
    let mut rows = Vec::with_capacity(table.len());
    for (index, record) in table.records.iter().enumerate() {
        let row = index + 1;
        let cell = |name: &str| table.get(record, name).unwrap_or_default().trim().to_string();
        let from = cell(COLUMN_FROM);
        let to = cell(COLUMN_TO);
        if from.is_empty() || to.is_empty() {
            return Err(IngestError::Row {
                path: path.to_string(),
                row,
                message: format!("empty {COLUMN_FROM} or {COLUMN_TO} (line {})", record.line),
            });
        }
        let reference = table
            .has_column(COLUMN_REFERENCE)
            .then(|| cell(COLUMN_REFERENCE));
        let edge_row = EdgeRow {
            row,
            from,
            to,
            reference,
        };
        graph.add_edge(edge_row.edge());
        rows.push(edge_row);
    }

    tracing::debug!(
        path,
        rows = rows.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "edge table loaded"
    );
    Ok((graph, rows))
}

pub fn read_edge_table(path: &Path) -> Result<(Graph, Vec<EdgeRow>), IngestError> {
    let table = read_csv(path)?;
    edge_rows(&table, &path.display().to_string())
}

/// Loss rows; every required column must be present, cells may be blank.
///
/// The reference cell is kept verbatim so padded ids fail the identifier rule.
pub fn loss_rows(table: &CsvTable, path: &str) -> Result<Vec<LossRow>, IngestError> {
    let missing = table.missing_columns(&LOSS_TABLE_COLUMNS);
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns {
            path: path.to_string(),
            missing,
        });
    }

    Ok(table
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let raw = |name: &str| table.get(record, name).unwrap_or_default();
            LossRow {
                row: index + 1,
                loss_form: raw(COLUMN_LOSS_FORM).trim().to_string(),
                parameters: raw(COLUMN_PARAMETERS).trim().to_string(),
                reference: raw(COLUMN_REFERENCE).to_string(),
            }
        })
        .collect())
}

pub fn read_loss_table(path: &Path) -> Result<Vec<LossRow>, IngestError> {
    let table = read_csv(path)?;
    loss_rows(&table, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimcheck_kernel::IdentifierRule;
    use claimcheck_kernel::check_loss_rows;
    use claimcheck_kernel::loss_form::FAILURE_CLASS_REFERENCE_FORMAT;

    fn table(text: &str) -> CsvTable {
        CsvTable::parse(text).expect("csv should parse")
    }

    #[test]
    fn edge_rows_build_graph_and_keep_references() {
        let (graph, rows) = edge_rows(
            &table("From,To,ReferenceLemma\n Psi.A , Psi.B ,Lk.Ref\nPsi.B,Psi.C,\nPsi.A,Psi.B,Lk.Ref\n"),
            "deps.csv",
        )
        .expect("rows should build");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].from, "Psi.A");
        assert_eq!(rows[0].reference.as_deref(), Some("Lk.Ref"));
        assert_eq!(rows[1].reference.as_deref(), Some(""));
        assert_eq!(rows[2].row, 3);
    }

    #[test]
    fn edge_rows_without_reference_column() {
        let (_, rows) = edge_rows(&table("To,From\nB,A\n"), "deps.csv").expect("rows should build");
        assert_eq!(rows[0].from, "A");
        assert_eq!(rows[0].reference, None);
    }

    #[test]
    fn edge_rows_reject_missing_columns_and_blank_endpoints() {
        let err = edge_rows(&table("Source,To\nA,B\n"), "deps.csv").expect_err("must fail");
        assert_eq!(err.to_string(), "deps.csv: missing columns From");

        let err = edge_rows(&table("From,To\nA,B\n ,C\n"), "deps.csv").expect_err("must fail");
        assert!(matches!(err, IngestError::Row { row: 2, .. }));
    }

    #[test]
    fn loss_rows_require_all_columns() {
        let err = loss_rows(&table("LossForm\nx\n"), "bridges.csv").expect_err("must fail");
        assert_eq!(
            err.to_string(),
            "bridges.csv: missing columns Parameters, ReferenceLemma"
        );

        let rows = loss_rows(
            &table("LossForm,Parameters,ReferenceLemma\n\"(d^a)\",\"d,a\", Lk.X \n"),
            "bridges.csv",
        )
        .expect("rows should build");
        assert_eq!(rows[0].loss_form, "(d^a)");
        assert_eq!(rows[0].parameters, "d,a");
        assert_eq!(rows[0].reference, " Lk.X ");
    }

    #[test]
    fn padded_loss_references_fail_the_identifier_rule() {
        let rows = loss_rows(
            &table("LossForm,Parameters,ReferenceLemma
(d^a),a, Psi.A
(d^a),a,Psi.B
"),
            "relax.csv",
        )
        .expect("rows should build");
        let findings = check_loss_rows("relax.csv", &rows, &IdentifierRule::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].class, FAILURE_CLASS_REFERENCE_FORMAT);
        assert_eq!(findings[0].subject, "relax.csv:1");
    }
}
