//! Error types for patch calculation and matching.

use crate::merge::MergeError;
use thiserror::Error;

/// Result type alias for object-matcher operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the annotator, the patch engine and the matcher.
///
/// Every variant names the object it concerns so that a failed reconciliation
/// can be traced back to a resource. None of them means "no change needed".
#[derive(Debug, Error)]
pub enum Error {
    /// The object could not be turned into canonical bytes.
    #[error("{operation}: failed to serialize {object}: {source}")]
    Serialization {
        operation: &'static str,
        object: String,
        source: serde_json::Error,
    },

    /// The stored original configuration is not a valid JSON document.
    #[error("{object}: invalid original configuration annotation: {message}")]
    Decode { object: String, message: String },

    /// The original configuration could not be encoded into the annotation.
    #[error("{object}: failed to encode original configuration annotation: {message}")]
    Encode { object: String, message: String },

    /// No merge metadata is known for the object's type.
    #[error("no merge metadata for {type_meta}: {message}")]
    MergeMetadataLookup { type_meta: String, message: String },

    /// The merge algorithm rejected the original/modified/current combination.
    #[error("{operation} for {object}: {source}")]
    MergeComputation {
        operation: &'static str,
        object: String,
        source: MergeError,
    },

    /// The object's representation is handled by neither merge path.
    #[error("unsupported object type: {type_name}")]
    UnsupportedType { type_name: String },

    /// The input bytes are not valid JSON.
    #[error("malformed input: {0}")]
    MalformedInput(serde_json::Error),

    /// The object store client failed.
    #[error("client error: {0}")]
    Client(String),
}

impl Error {
    pub(crate) fn serialization(
        operation: &'static str,
        object: impl ToString,
        source: serde_json::Error,
    ) -> Self {
        Error::Serialization {
            operation,
            object: object.to_string(),
            source,
        }
    }

    pub(crate) fn decode(object: impl ToString, message: impl Into<String>) -> Self {
        Error::Decode {
            object: object.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn encode(object: impl ToString, message: impl Into<String>) -> Self {
        Error::Encode {
            object: object.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn merge(operation: &'static str, object: impl ToString, source: MergeError) -> Self {
        Error::MergeComputation {
            operation,
            object: object.to_string(),
            source,
        }
    }
}
