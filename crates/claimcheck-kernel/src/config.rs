//! Explicit configuration for every check.
//!
//! Configuration is a plain value handed to validators at construction time.
//! It is loaded from an optional TOML file; every table and key has a default,
//! unknown keys are rejected.
//!
//! ```toml
//! [graph]
//! identifier_pattern = '^[A-Z][A-Za-z0-9]*(?:\.[A-Za-z0-9_]+)+$'
//! strict = false
//! require_full_coverage = false
//!
//! [project]
//! ignored_dirs = [".git", "build"]
//! figure_extensions = ["png", "pdf"]
//! figure_dir = "fig"
//! theorem_namespaces = ["Budget", "Psi", "Lk", "AntiSim"]
//!
//! [bridges]
//! machine_tree = "Bridge:MachineTree"
//! tree_circuit = "Bridge:TreeCircuit"
//! machine_circuit = "Bridge:MachineCircuit:Cor"
//! ```

use crate::error::ConfigError;
use crate::identifier::{DEFAULT_IDENTIFIER_PATTERN, IdentifierRule};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_IGNORED_DIRS: [&str; 8] = [
    ".git",
    ".venv",
    "venv",
    "_build",
    "build",
    "out",
    "dist",
    "__pycache__",
];
pub const DEFAULT_FIGURE_EXTENSIONS: [&str; 5] = ["png", "pdf", "jpg", "jpeg", "eps"];
pub const DEFAULT_FIGURE_DIR: &str = "fig";
pub const DEFAULT_THEOREM_NAMESPACES: [&str; 4] = ["Budget", "Psi", "Lk", "AntiSim"];

pub const DEFAULT_BRIDGE_MACHINE_TREE: &str = "Bridge:MachineTree";
pub const DEFAULT_BRIDGE_TREE_CIRCUIT: &str = "Bridge:TreeCircuit";
pub const DEFAULT_BRIDGE_MACHINE_CIRCUIT: &str = "Bridge:MachineCircuit:Cor";

/// Root of a `claimcheck.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    pub graph: ValidatorConfig,
    pub project: ProjectConfig,
    pub bridges: BridgeConfig,
}

impl CheckConfig {
    /// Load config from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.display().to_string(),
            source,
        })?;
        // Fail on a bad pattern at load time rather than at first use.
        config.graph.identifier_rule()?;
        tracing::debug!(path = %path.display(), "loaded check config");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Settings consumed by [`crate::GraphValidator`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    pub identifier_pattern: String,
    /// Check edge endpoints against the identifier rule.
    pub strict: bool,
    /// Also report registry entries that never appear in the graph.
    pub require_full_coverage: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            identifier_pattern: DEFAULT_IDENTIFIER_PATTERN.to_string(),
            strict: false,
            require_full_coverage: false,
        }
    }
}

impl ValidatorConfig {
    pub fn identifier_rule(&self) -> Result<IdentifierRule, ConfigError> {
        if self.identifier_pattern == DEFAULT_IDENTIFIER_PATTERN {
            return Ok(IdentifierRule::default());
        }
        IdentifierRule::new(&self.identifier_pattern)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Settings for LaTeX project scanning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub ignored_dirs: Vec<String>,
    /// Extensions without the leading dot.
    pub figure_extensions: Vec<String>,
    pub figure_dir: String,
    pub theorem_namespaces: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
            figure_extensions: DEFAULT_FIGURE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            figure_dir: DEFAULT_FIGURE_DIR.to_string(),
            theorem_namespaces: DEFAULT_THEOREM_NAMESPACES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ProjectConfig {
    /// Whether any component of `path` names an ignored directory.
    pub fn is_ignored(&self, path: &Path) -> bool {
        path.components().any(|component| {
            let part = component.as_os_str().to_string_lossy();
            self.ignored_dirs.iter().any(|dir| *dir == part)
        })
    }

    /// Normalized extension list: lowercase, no leading dot, no blanks.
    pub fn normalized_extensions(&self) -> Vec<String> {
        normalize_extensions(self.figure_extensions.iter().map(String::as_str))
    }
}

/// Lowercase, strip leading dots, drop blanks, keep first occurrence order.
pub fn normalize_extensions<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for ext in raw {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        if !ext.is_empty() && !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}

/// Reference IDs of the three bridge theorems.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub machine_tree: String,
    pub tree_circuit: String,
    pub machine_circuit: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            machine_tree: DEFAULT_BRIDGE_MACHINE_TREE.to_string(),
            tree_circuit: DEFAULT_BRIDGE_TREE_CIRCUIT.to_string(),
            machine_circuit: DEFAULT_BRIDGE_MACHINE_CIRCUIT.to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn ids(&self) -> [&str; 3] {
        [&self.machine_tree, &self.tree_circuit, &self.machine_circuit]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = CheckConfig::from_toml_str("").expect("empty config should parse");
        assert_eq!(config, CheckConfig::default());
        assert_eq!(config.graph.identifier_pattern, DEFAULT_IDENTIFIER_PATTERN);
        assert!(!config.graph.strict);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = CheckConfig::from_toml_str(
            "[graph]\nstrict = true\n\n[project]\nfigure_dir = \"figures\"\n",
        )
        .expect("config should parse");
        assert!(config.graph.strict);
        assert_eq!(config.graph.identifier_pattern, DEFAULT_IDENTIFIER_PATTERN);
        assert_eq!(config.project.figure_dir, "figures");
        assert_eq!(config.project.theorem_namespaces.len(), 4);
        assert_eq!(config.bridges, BridgeConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CheckConfig::from_toml_str("[graph]\nstrictness = true\n");
        assert!(err.is_err());
    }

    #[test]
    fn ignored_dirs_match_any_component() {
        let project = ProjectConfig::default();
        assert!(project.is_ignored(Path::new("paper/build/main.tex")));
        assert!(project.is_ignored(Path::new(".git/hooks/x.tex")));
        assert!(!project.is_ignored(Path::new("paper/sections/builder.tex")));
    }

    #[test]
    fn extensions_are_normalized() {
        assert_eq!(
            normalize_extensions([".PNG", "pdf", " ", "png", "jpg"]),
            vec!["png".to_string(), "pdf".to_string(), "jpg".to_string()]
        );
    }

    #[test]
    fn load_without_path_returns_defaults() {
        let config = CheckConfig::load(None).expect("defaults should load");
        assert_eq!(config, CheckConfig::default());
    }
}
