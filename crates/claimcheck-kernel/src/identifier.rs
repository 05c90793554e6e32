//! Structural format rule for claim identifiers.

use crate::error::ConfigError;
use regex::Regex;
use std::fmt;

/// Uppercase-leading token with at least one dot-separated qualifier,
/// e.g. `Psi.Budget.upper`.
pub const DEFAULT_IDENTIFIER_PATTERN: &str = r"^[A-Z][A-Za-z0-9]*(?:\.[A-Za-z0-9_]+)+$";

/// Compiled identifier-format rule.
///
/// The rule is purely structural: it says nothing about registry membership.
#[derive(Clone)]
pub struct IdentifierRule {
    pattern: Regex,
}

impl IdentifierRule {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(pattern).map_err(|source| ConfigError::IdentifierPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    /// Whether `candidate` satisfies the rule.
    ///
    /// Surrounding whitespace is never part of an identifier.
    pub fn matches(&self, candidate: &str) -> bool {
        candidate == candidate.trim() && self.pattern.is_match(candidate)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for IdentifierRule {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_IDENTIFIER_PATTERN)
                .expect("default identifier regex must compile"),
        }
    }
}

impl fmt::Debug for IdentifierRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IdentifierRule")
            .field(&self.pattern.as_str())
            .finish()
    }
}
