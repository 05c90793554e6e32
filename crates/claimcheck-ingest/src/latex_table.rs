//! CSV tables rendered as LaTeX `table` environments.

use crate::csv::CsvTable;
use crate::tables::{COLUMN_LOSS_FORM, COLUMN_PARAMETERS};

pub const DEFAULT_CAPTION: &str = "Proof DAG with explicit, localized losses.";

/// Escape LaTeX specials for text-mode cells.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str(r"\textbackslash{}"),
            '_' | '%' | '&' | '#' | '{' | '}' | '$' => {
                out.push('\\');
                out.push(ch);
            }
            '^' => out.push_str(r"\^{}"),
            '~' => out.push_str(r"\~{}"),
            _ => out.push(ch),
        }
    }
    out
}

fn greek(text: &str) -> String {
    text.replace('α', r"\alpha").replace('β', r"\beta")
}

pub fn format_loss_form(cell: &str) -> String {
    let math = greek(&cell.trim().replace("log_2", r"\log_{2}").replace('×', r"\times"));
    format!("${math}$")
}

/// Blank or dash-only parameter cells render as an em dash.
pub fn format_parameters(cell: &str) -> String {
    let cell = cell.trim();
    if matches!(cell, "" | "-" | "–" | "—") {
        return r"\textemdash{}".to_string();
    }
    format!("${}$", greek(cell))
}

fn format_cell(column: &str, cell: &str) -> String {
    match column {
        COLUMN_LOSS_FORM => format_loss_form(cell),
        COLUMN_PARAMETERS => format_parameters(cell),
        _ => escape_text(cell),
    }
}

/// Render every column left-aligned, header first.
pub fn render_latex_table(table: &CsvTable, caption: &str) -> String {
    let columns = "l".repeat(table.header.len());
    let header = table
        .header
        .iter()
        .map(|name| escape_text(name))
        .collect::<Vec<_>>()
        .join(" & ");

    let mut out = String::new();
    out.push_str("\\begin{table}[t]\n");
    out.push_str("  \\centering\n");
    out.push_str("  \\resizebox{\\textwidth}{!}{%\n");
    out.push_str(&format!("  \\begin{{tabular}}{{{columns}}}\n"));
    out.push_str(&format!("    {header} \\\\\n"));
    out.push_str("    \\hline\n");
    for record in &table.records {
        let cells = table
            .header
            .iter()
            .zip(&record.fields)
            .map(|(column, cell)| format_cell(column, cell))
            .collect::<Vec<_>>()
            .join(" & ");
        out.push_str(&format!("    {cells} \\\\\n"));
    }
    out.push_str("  \\end{tabular}%\n");
    out.push_str("  }\n");
    out.push_str(&format!("  \\caption{{{caption}}}\n"));
    out.push_str("\\end{table}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_text_cells() {
        assert_eq!(escape_text(r"a_b 50% {x}\y"), r"a\_b 50\% \{x\}\textbackslash{}y");
    }

    #[test]
    fn renders_table() {
        let table = CsvTable::parse(
            "From,To,LossForm,Parameters\nPsi.A,Lk.B_1,(d^α) × log_2 n,—\nPsi.B,Lk.C,(k^β),β\n",
        )
        .expect("csv should parse");
        insta::assert_snapshot!(render_latex_table(&table, "Bridges."), @r"
        \begin{table}[t]
          \centering
          \resizebox{\textwidth}{!}{%
          \begin{tabular}{llll}
            From & To & LossForm & Parameters \\
            \hline
            Psi.A & Lk.B\_1 & $(d^\alpha) \times \log_{2} n$ & \textemdash{} \\
            Psi.B & Lk.C & $(k^\beta)$ & $\beta$ \\
          \end{tabular}%
          }
          \caption{Bridges.}
        \end{table}
        ");
    }
}
