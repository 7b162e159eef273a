//! Error types for the flatten crate.

use polcmp_types::DocumentError;

/// Errors that can occur while flattening a document.
#[derive(Debug, thiserror::Error)]
pub enum FlattenError {
    /// The document is not valid JSON or violates the shape of the selected
    /// mode. `path` is the flattened key where the problem was found.
    #[error("malformed input at '{path}': {reason}")]
    MalformedInput { path: String, reason: String },

    /// A field the selected mode cannot work without is absent.
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),
}

impl FlattenError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<DocumentError> for FlattenError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::MalformedNode {
                definition_id,
                reason,
            } => Self::malformed(definition_id, reason),
            DocumentError::Json(e) => Self::malformed("<document>", e.to_string()),
        }
    }
}

/// Convenience alias for flatten results.
pub type FlattenResult<T> = Result<T, FlattenError>;
