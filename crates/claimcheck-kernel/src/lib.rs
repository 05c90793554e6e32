//! # Claimcheck Kernel
//!
//! Judgement over claims: a paper's theorems are tracked both as LaTeX labels
//! and as formal-proof identifiers, and the two sides must agree.
//!
//! This crate is **format-agnostic**: it never parses DOT, CSV, YAML, or TeX.
//! It consumes plain data (identifier sets, edge lists, rows) and returns
//! findings.
//!
//! ## Architecture
//!
//! ```text
//! CheckConfig           ← Explicit configuration (TOML-loadable)
//!     │
//! Registry              ← Declared formal identifiers
//! Graph / EdgeRow       ← Claim dependency edges
//!     │
//! GraphValidator        ← Acyclicity (Kahn) + registry coverage
//!     │
//! CheckReport           ← Findings, failure classes, accepted/rejected
//! ```
//!
//! Companion checks (claims consistency, loss forms, LaTeX project rules,
//! anchors) share the same [`CheckReport`] surface.

pub mod anchors;
pub mod claims;
pub mod config;
pub mod error;
pub mod graph;
pub mod identifier;
pub mod loss_form;
pub mod project;
pub mod registry;
pub mod report;
pub mod validator;

pub use anchors::{AnchorProfile, check_anchors};
pub use claims::{ClaimEntry, check_claims, latex_labels, registry_from_claims};
pub use config::{BridgeConfig, CheckConfig, ProjectConfig, ValidatorConfig};
pub use error::ConfigError;
pub use graph::{Edge, EdgeRow, Graph};
pub use identifier::{DEFAULT_IDENTIFIER_PATTERN, IdentifierRule};
pub use loss_form::{LossForm, LossRow, check_bridges, check_composition, check_loss_rows};
pub use project::{
    ClaimsContext, FigureRef, LabelUse, ProjectScan, check_assets, check_project,
};
pub use registry::Registry;
pub use report::{CheckReport, Finding};
pub use validator::{
    AcyclicityReport, Endpoint, GraphReport, GraphSummary, GraphValidator, Violation,
    check_acyclic,
};
