//! Findings, check reports, and deterministic input digests.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

pub const RESULT_ACCEPTED: &str = "accepted";
pub const RESULT_REJECTED: &str = "rejected";

/// One reportable problem.
///
/// `subject` names what the finding is about (a node, a row, a file);
/// `class` is a stable dotted failure class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub subject: String,
    pub class: String,
    pub message: String,
}

impl Finding {
    pub fn new(
        subject: impl Into<String>,
        class: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            class: class.into(),
            message: message.into(),
        }
    }
}

/// Outcome of one check over already-loaded data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub check_kind: String,
    pub result: String,
    pub failure_classes: Vec<String>,
    pub warning_classes: Vec<String>,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl CheckReport {
    pub fn new(check_kind: &str, errors: Vec<Finding>, warnings: Vec<Finding>) -> Self {
        let result = if errors.is_empty() {
            RESULT_ACCEPTED
        } else {
            RESULT_REJECTED
        };
        Self {
            check_kind: check_kind.to_string(),
            result: result.to_string(),
            failure_classes: collect_classes(&errors),
            warning_classes: collect_classes(&warnings),
            errors,
            warnings,
        }
    }

    pub fn accepted(&self) -> bool {
        self.result == RESULT_ACCEPTED
    }
}

fn collect_classes(findings: &[Finding]) -> Vec<String> {
    findings
        .iter()
        .map(|finding| finding.class.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Incremental SHA-256 over named fields, in the order they are fed.
pub struct DigestBuilder {
    hasher: Sha256,
}

impl DigestBuilder {
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.hasher.update(name.as_bytes());
        self.hasher.update(b":");
        self.hasher.update(value.as_bytes());
        self.hasher.update(b"\n");
        self
    }

    pub fn finish(self) -> String {
        let hash = self.hasher.finalize();
        format!("{hash:x}")
    }
}

impl Default for DigestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
