//! Error types for kernel configuration.

/// Errors raised while loading or compiling a [`crate::ValidatorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// The configured identifier pattern is not a valid regular expression.
    #[error("invalid identifier pattern {pattern:?}: {source}")]
    IdentifierPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
