//! Loss-form expressions: lexical screening, a small grammar, and bridge
//! composition.
//!
//! A structured loss form is a product of powers:
//!
//! ```text
//! loss     := factor ( "*" factor )*
//! factor   := "(" base "^" exponent ")"
//! base     := "log2(n)" | name
//! exponent := symbol ( "+" symbol )?
//! symbol   := [a-z]+
//! ```
//!
//! Only three shapes are admissible: `(d^a)*(log2(n)^b)`,
//! `(k^a)*(log2(n)^b)`, and `(d^a)*(k^b)*(log2(n)^c)`. The symbolic sum is
//! reserved for the `log2(n)` exponent of the three-factor shape, where it
//! records a composed bound.

use crate::config::BridgeConfig;
use crate::identifier::IdentifierRule;
use crate::registry::Registry;
use crate::report::{CheckReport, Finding};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

pub const LOSS_FORMS_CHECK_KIND: &str = "claimcheck.loss_forms.check.v1";
pub const BRIDGES_CHECK_KIND: &str = "claimcheck.bridges.check.v1";

pub const FAILURE_CLASS_COLUMNS_MISSING: &str = "loss_form.columns.missing";
pub const FAILURE_CLASS_LOSS_FORM_TOKENS: &str = "loss_form.tokens.disallowed";
pub const FAILURE_CLASS_REFERENCE_FORMAT: &str = "loss_form.reference.malformed";
pub const FAILURE_CLASS_BRIDGE_CLAIM_MISSING: &str = "bridges.claim.missing";
pub const FAILURE_CLASS_BRIDGE_ROW_COUNT: &str = "bridges.rows.count";
pub const FAILURE_CLASS_BRIDGE_ROW_MISSING: &str = "bridges.row.missing";
pub const FAILURE_CLASS_LOSS_FORM_EMPTY: &str = "bridges.loss_form.empty";
pub const FAILURE_CLASS_LOSS_FORM_SYNTAX: &str = "bridges.loss_form.syntax";
pub const FAILURE_CLASS_LOSS_FORM_SHAPE: &str = "bridges.loss_form.shape";
pub const FAILURE_CLASS_COMPOSITION: &str = "bridges.composition.mismatch";

pub const LOG2_N: &str = "log2(n)";

const ALLOWED_SHAPES: [&[&str]; 3] = [&["d", LOG2_N], &["k", LOG2_N], &["d", "k", LOG2_N]];

fn allowed_tokens_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:log_2|B|n|d|k|M|\(|\)|\+|\s|\^|×|,|0|1|-)+\s*$")
            .expect("loss-form token regex must compile")
    })
}

/// Whether `text` uses only the tokens allowed in tabulated loss forms.
pub fn has_allowed_tokens(text: &str) -> bool {
    allowed_tokens_re().is_match(text)
}

/// One row of a loss-form table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LossRow {
    /// 1-based data row number.
    pub row: usize,
    pub loss_form: String,
    pub parameters: String,
    pub reference: String,
}

/// Finding for a table that lacks required columns.
pub fn missing_columns_finding(source: &str, missing: &[String]) -> Finding {
    Finding::new(
        source,
        FAILURE_CLASS_COLUMNS_MISSING,
        format!("{source}: missing columns {}", missing.join(", ")),
    )
}

/// Lexical screening of every row: allowed tokens in `LossForm`, identifier
/// format for `ReferenceLemma`.
pub fn check_loss_rows(source: &str, rows: &[LossRow], rule: &IdentifierRule) -> Vec<Finding> {
    let mut findings = Vec::new();
    for row in rows {
        let subject = format!("{source}:{}", row.row);
        if !has_allowed_tokens(&row.loss_form) {
            findings.push(Finding::new(
                subject.clone(),
                FAILURE_CLASS_LOSS_FORM_TOKENS,
                format!("{subject} LossForm bad: {}", row.loss_form),
            ));
        }
        if !rule.matches(&row.reference) {
            findings.push(Finding::new(
                subject.clone(),
                FAILURE_CLASS_REFERENCE_FORMAT,
                format!("{subject} ReferenceLemma bad: {}", row.reference),
            ));
        }
    }
    findings
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("at offset {offset}: expected {expected}, found {found}")]
pub struct LossFormSyntaxError {
    pub offset: usize,
    pub expected: &'static str,
    pub found: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Factor {
    pub base: String,
    /// One symbol, or two for a composed exponent.
    pub exponent: Vec<String>,
}

impl Factor {
    pub fn exponent_text(&self) -> String {
        self.exponent.join("+")
    }
}

/// A parsed loss form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LossForm {
    pub factors: Vec<Factor>,
}

/// Remove a `$...$` math wrapper left by table rendering.
pub fn strip_math(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('$')
        .and_then(|rest| rest.strip_suffix('$'))
        .unwrap_or(trimmed)
}

impl FromStr for LossForm {
    type Err = LossFormSyntaxError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let compact: String = strip_math(text)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let mut parser = Parser {
            input: &compact,
            offset: 0,
        };
        let mut factors = vec![parser.factor()?];
        while parser.eat("*") {
            factors.push(parser.factor()?);
        }
        if parser.offset != compact.len() {
            return Err(parser.error("`*` or end of input"));
        }
        Ok(Self { factors })
    }
}

struct Parser<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.offset += token.len();
            true
        } else {
            false
        }
    }

    fn error(&self, expected: &'static str) -> LossFormSyntaxError {
        let found = match self.rest().chars().next() {
            Some(c) => format!("{c:?}"),
            None => "end of input".to_string(),
        };
        LossFormSyntaxError {
            offset: self.offset,
            expected,
            found,
        }
    }

    fn expect(&mut self, token: &'static str) -> Result<(), LossFormSyntaxError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(token))
        }
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.offset;
        let len = self
            .rest()
            .char_indices()
            .find(|&(_, c)| !accept(c))
            .map(|(i, _)| i)
            .unwrap_or(self.rest().len());
        self.offset += len;
        &self.input[start..self.offset]
    }

    fn factor(&mut self) -> Result<Factor, LossFormSyntaxError> {
        self.expect("(")?;
        let base = if self.eat(LOG2_N) {
            LOG2_N.to_string()
        } else {
            let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
            if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
                return Err(self.error("a parameter name or `log2(n)`"));
            }
            name.to_string()
        };
        self.expect("^")?;
        let mut exponent = vec![self.symbol()?];
        while self.eat("+") {
            exponent.push(self.symbol()?);
        }
        self.expect(")")?;
        Ok(Factor { base, exponent })
    }

    fn symbol(&mut self) -> Result<String, LossFormSyntaxError> {
        let symbol = self.take_while(|c| c.is_ascii_lowercase());
        if symbol.is_empty() {
            return Err(self.error("a lowercase exponent symbol"));
        }
        Ok(symbol.to_string())
    }
}

impl LossForm {
    pub fn bases(&self) -> Vec<&str> {
        self.factors.iter().map(|f| f.base.as_str()).collect()
    }

    /// Rendered exponent of `base`, e.g. `"a+b"`.
    pub fn exponent_of(&self, base: &str) -> Option<String> {
        self.factors
            .iter()
            .find(|factor| factor.base == base)
            .map(Factor::exponent_text)
    }

    /// Check the factor sequence against the admissible shapes.
    pub fn check_shape(&self) -> Result<(), String> {
        let bases = self.bases();
        if !ALLOWED_SHAPES.iter().any(|shape| *shape == bases.as_slice()) {
            return Err(format!(
                "factor bases [{}] are not an allowed shape",
                bases.join(", ")
            ));
        }
        let composed_shape = bases.len() == 3;
        for factor in &self.factors {
            let max_terms = if composed_shape && factor.base == LOG2_N {
                2
            } else {
                1
            };
            if factor.exponent.len() > max_terms {
                return Err(format!(
                    "exponent {} of {} may not be a sum",
                    factor.exponent_text(),
                    factor.base
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for LossForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .factors
            .iter()
            .map(|factor| format!("({}^{})", factor.base, factor.exponent_text()))
            .collect::<Vec<_>>()
            .join("*");
        f.write_str(&rendered)
    }
}

/// Composition law: the machine-circuit bound is the product of the
/// machine-tree and tree-circuit bounds, with `log2(n)` exponents added.
pub fn check_composition(
    machine_tree: &LossForm,
    tree_circuit: &LossForm,
    machine_circuit: &LossForm,
) -> Vec<Finding> {
    let (Some(log_mt), Some(log_tc)) = (
        machine_tree.exponent_of(LOG2_N),
        tree_circuit.exponent_of(LOG2_N),
    ) else {
        return vec![Finding::new(
            LOG2_N,
            FAILURE_CLASS_COMPOSITION,
            "log2(n) exponent missing in base losses",
        )];
    };

    let expected = [
        ("d", machine_tree.exponent_of("d")),
        ("k", tree_circuit.exponent_of("k")),
        (LOG2_N, Some(format!("{log_mt}+{log_tc}"))),
    ];
    let label = |base: &str| {
        if base == LOG2_N {
            "log2".to_string()
        } else {
            base.to_string()
        }
    };
    let render = |value: &Option<String>| value.clone().unwrap_or_else(|| "none".to_string());

    expected
        .into_iter()
        .filter_map(|(base, want)| {
            let got = machine_circuit.exponent_of(base);
            (got != want).then(|| {
                Finding::new(
                    base,
                    FAILURE_CLASS_COMPOSITION,
                    format!(
                        "{} exponent mismatch: expected {}, got {}",
                        label(base),
                        render(&want),
                        render(&got)
                    ),
                )
            })
        })
        .collect()
}

/// Bridges table against the claims registry and the composition law.
///
/// Registry, row-count, and row-presence problems end the check early since
/// later stages have nothing sound to compare.
pub fn check_bridges(rows: &[LossRow], registry: &Registry, bridges: &BridgeConfig) -> CheckReport {
    let report = |errors| CheckReport::new(BRIDGES_CHECK_KIND, errors, Vec::new());

    let missing_claims: Vec<Finding> = bridges
        .ids()
        .into_iter()
        .filter(|id| !registry.contains(id))
        .map(|id| {
            Finding::new(
                id,
                FAILURE_CLASS_BRIDGE_CLAIM_MISSING,
                format!("claims registry missing bridge ID: {id}"),
            )
        })
        .collect();
    if !missing_claims.is_empty() {
        return report(missing_claims);
    }

    if rows.len() != 3 {
        return report(vec![Finding::new(
            "bridges",
            FAILURE_CLASS_BRIDGE_ROW_COUNT,
            format!("CSV must have exactly 3 rows, found {}", rows.len()),
        )]);
    }

    let by_reference: BTreeMap<&str, &LossRow> =
        rows.iter().map(|row| (row.reference.as_str(), row)).collect();
    let missing_rows: Vec<Finding> = bridges
        .ids()
        .into_iter()
        .filter(|id| !by_reference.contains_key(id))
        .map(|id| {
            Finding::new(
                id,
                FAILURE_CLASS_BRIDGE_ROW_MISSING,
                format!("missing row for {id}"),
            )
        })
        .collect();
    if !missing_rows.is_empty() {
        return report(missing_rows);
    }

    let mut errors = Vec::new();
    let mut parsed: BTreeMap<&str, LossForm> = BTreeMap::new();
    for row in rows {
        let text = strip_math(&row.loss_form);
        let subject = format!("row {}", row.row);
        if text.is_empty() {
            errors.push(Finding::new(
                subject,
                FAILURE_CLASS_LOSS_FORM_EMPTY,
                format!("empty LossForm for {}", row.reference),
            ));
            continue;
        }
        match text.parse::<LossForm>() {
            Err(err) => errors.push(Finding::new(
                subject,
                FAILURE_CLASS_LOSS_FORM_SYNTAX,
                format!("LossForm not explicit or not allowed: {text} ({err})"),
            )),
            Ok(form) => match form.check_shape() {
                Err(reason) => errors.push(Finding::new(
                    subject,
                    FAILURE_CLASS_LOSS_FORM_SHAPE,
                    format!("LossForm not explicit or not allowed: {text} ({reason})"),
                )),
                Ok(()) => {
                    parsed.insert(row.reference.as_str(), form);
                }
            },
        }
    }

    if errors.is_empty()
        && let (Some(mt), Some(tc), Some(mc)) = (
            parsed.get(bridges.machine_tree.as_str()),
            parsed.get(bridges.tree_circuit.as_str()),
            parsed.get(bridges.machine_circuit.as_str()),
        )
    {
        errors.extend(check_composition(mt, tc, mc));
    }

    tracing::info!(rows = rows.len(), errors = errors.len(), "bridges checked");
    report(errors)
}
