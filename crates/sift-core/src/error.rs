use thiserror::Error;

/// Errors from remote extraction providers.
///
/// `Network` and `Server` are service failures, `InvalidResponse` is a payload
/// that did not parse as the expected JSON array. Every variant degrades to the
/// pattern extractor inside the orchestrator.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("extract provider setup failed: {0}")]
    Failed(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ExtractError {
    /// Whether the failure came from the remote service rather than its payload.
    pub fn is_service_error(&self) -> bool {
        matches!(self, ExtractError::Network(_) | ExtractError::Server { .. })
    }
}

/// Contract violations in a priority keyword set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeywordError {
    #[error("priority keyword list `{0}` is missing")]
    MissingList(&'static str),
}

/// Errors from capture source collaborators.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture network error: {0}")]
    Network(String),

    #[error("invalid capture query: {0}")]
    Query(String),

    #[error("capture io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("capture parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid capture response: {0}")]
    InvalidResponse(String),
}

/// Errors from the persisted task store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task store parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
