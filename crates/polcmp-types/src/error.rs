use thiserror::Error;

/// Errors produced while decoding a policy document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid policy json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed setting '{definition_id}': {reason}")]
    MalformedNode {
        definition_id: String,
        reason: String,
    },
}

/// Convenience alias for document decoding results.
pub type DocumentResult<T> = Result<T, DocumentError>;
