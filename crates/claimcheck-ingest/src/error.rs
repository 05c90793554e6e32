//! Ingestion errors: anything that makes an input unusable.

use crate::csv::CsvError;
use crate::dot::DotError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid graph at {path}: {source}")]
    Dot {
        path: String,
        #[source]
        source: DotError,
    },

    #[error("invalid csv at {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: CsvError,
    },

    #[error("invalid yaml at {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The claims file parsed but does not have the registry shape.
    #[error("invalid claims registry at {path}: {message}")]
    Claims { path: String, message: String },

    #[error("{path}: missing columns {}", .missing.join(", "))]
    MissingColumns { path: String, missing: Vec<String> },

    #[error("{path}: row {row}: {message}")]
    Row {
        path: String,
        row: usize,
        message: String,
    },

    #[error("failed to walk {path}: {message}")]
    Walk { path: String, message: String },
}

impl IngestError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        IngestError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
