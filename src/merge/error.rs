//! Errors of the merge algorithms.

use thiserror::Error;

/// MergeError is returned when a merge algorithm rejects its inputs.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("invalid {document} document: {source}")]
    InvalidDocument {
        document: &'static str,
        source: serde_json::Error,
    },

    #[error("{document} document is not a JSON object")]
    NotAnObject { document: &'static str },

    #[error("{path}: list element does not contain declared merge key {key}")]
    MissingMergeKey { path: String, key: String },

    #[error("{path}: list element is not an object")]
    NonMapListElement { path: String },

    #[error("{path}: patch conflicts with a change made since the last apply")]
    Conflict { path: String },

    #[error("failed to serialize patch: {0}")]
    Serialize(serde_json::Error),
}

impl MergeError {
    pub fn missing_merge_key(path: impl Into<String>, key: impl Into<String>) -> Self {
        MergeError::MissingMergeKey {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn conflict(path: impl Into<String>) -> Self {
        MergeError::Conflict { path: path.into() }
    }
}
