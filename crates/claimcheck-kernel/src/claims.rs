//! Claims-registry consistency.
//!
//! A claim links a LaTeX label to a formal-proof identifier. Within one
//! registry both sides must be unique, and every formal identifier must be
//! declared in proof-assistant source.

use crate::registry::Registry;
use crate::report::{CheckReport, Finding};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const CLAIMS_CHECK_KIND: &str = "claimcheck.claims.check.v1";

pub const FAILURE_CLASS_DUPLICATE_LATEX: &str = "claims.latex.duplicate";
pub const FAILURE_CLASS_DUPLICATE_LEAN: &str = "claims.lean.duplicate";
pub const FAILURE_CLASS_UNDECLARED_LEAN: &str = "claims.lean.undeclared";

/// One registry entry; both fields are non-empty once constructed by ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEntry {
    pub latex: String,
    pub lean: String,
}

impl ClaimEntry {
    pub fn new(latex: impl Into<String>, lean: impl Into<String>) -> Self {
        Self {
            latex: latex.into(),
            lean: lean.into(),
        }
    }
}

/// Formal identifiers of every entry.
pub fn registry_from_claims(entries: &[ClaimEntry]) -> Registry {
    entries.iter().map(|entry| entry.lean.clone()).collect()
}

/// LaTeX labels of every entry.
pub fn latex_labels(entries: &[ClaimEntry]) -> BTreeSet<String> {
    entries.iter().map(|entry| entry.latex.clone()).collect()
}

/// Duplicate labels/identifiers in entry order, then undeclared identifiers
/// sorted.
pub fn check_claims(entries: &[ClaimEntry], declared: &BTreeSet<String>) -> CheckReport {
    let mut errors = Vec::new();
    let mut latex_seen = BTreeSet::new();
    let mut lean_seen = BTreeSet::new();

    for (index, entry) in entries.iter().enumerate() {
        if !latex_seen.insert(entry.latex.as_str()) {
            errors.push(Finding::new(
                entry.latex.clone(),
                FAILURE_CLASS_DUPLICATE_LATEX,
                format!("entry {index}: duplicate LaTeX label: {}", entry.latex),
            ));
        }
        if !lean_seen.insert(entry.lean.as_str()) {
            errors.push(Finding::new(
                entry.lean.clone(),
                FAILURE_CLASS_DUPLICATE_LEAN,
                format!("entry {index}: duplicate Lean ID: {}", entry.lean),
            ));
        }
    }

    for id in lean_seen.iter().filter(|id| !declared.contains(**id)) {
        errors.push(Finding::new(
            *id,
            FAILURE_CLASS_UNDECLARED_LEAN,
            format!("Lean ID not declared with a `-- ID:` header: {id}"),
        ));
    }

    tracing::info!(
        entries = entries.len(),
        declared = declared.len(),
        errors = errors.len(),
        "claims checked"
    );
    CheckReport::new(CLAIMS_CHECK_KIND, errors, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn consistent_registry_is_accepted() {
        let entries = vec![
            ClaimEntry::new("Psi:thm:main", "Psi.Main"),
            ClaimEntry::new("Lk:lem:aux", "Lk.Aux"),
        ];
        let report = check_claims(&entries, &declared(&["Psi.Main", "Lk.Aux", "Extra.Id"]));
        assert!(report.accepted());
    }

    #[test]
    fn every_problem_is_reported() {
        let entries = vec![
            ClaimEntry::new("Psi:thm:main", "Psi.Main"),
            ClaimEntry::new("Psi:thm:main", "Psi.Other"),
            ClaimEntry::new("Lk:lem:aux", "Psi.Main"),
        ];
        let report = check_claims(&entries, &declared(&["Psi.Main"]));
        let classes = report
            .errors
            .iter()
            .map(|finding| finding.class.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            classes,
            vec![
                FAILURE_CLASS_DUPLICATE_LATEX,
                FAILURE_CLASS_DUPLICATE_LEAN,
                FAILURE_CLASS_UNDECLARED_LEAN,
            ]
        );
        assert_eq!(report.errors[2].subject, "Psi.Other");
    }

    #[test]
    fn registry_uses_lean_side() {
        let registry = registry_from_claims(&[ClaimEntry::new("Psi:thm:main", "Psi.Main")]);
        assert!(registry.contains("Psi.Main"));
        assert!(!registry.contains("Psi:thm:main"));
    }
}
