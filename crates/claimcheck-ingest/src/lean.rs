//! Declared formal identifiers: `-- ID: <Token>` header lines in Lean files.

use crate::error::IngestError;
use crate::walk::files_with_extensions;
use claimcheck_kernel::ProjectConfig;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

fn id_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^--\s*ID:\s*(\S+)\s*$")
            .expect("id header regex must compile")
    })
}

/// Identifiers declared in one source text.
pub fn declared_ids_in(text: &str) -> impl Iterator<Item = &str> {
    id_header_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Every identifier declared under `root`, ignored directories skipped.
pub fn scan_lean_ids(root: &Path, config: &ProjectConfig) -> Result<BTreeSet<String>, IngestError> {
    let mut ids = BTreeSet::new();
    let files = files_with_extensions(root, &["lean".to_string()], config)?;
    for file in &files {
        let text = fs::read_to_string(file).map_err(|e| IngestError::io(file, e))?;
        ids.extend(declared_ids_in(&text).map(str::to_string));
    }
    tracing::debug!(
        root = %root.display(),
        files = files.len(),
        ids = ids.len(),
        "lean headers scanned"
    );
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_header_lines_only() {
        let text = "-- ID: Psi.Main\n--ID:Lk.Aux  \r\ntheorem x : True := trivial -- ID: Not.This\n  -- ID: Indented.No\n-- ID: two tokens\n";
        let ids: Vec<&str> = declared_ids_in(text).collect();
        assert_eq!(ids, vec!["Psi.Main", "Lk.Aux"]);
    }
}
