//! Error taxonomy shared by the store, the model client, and the flows.

use crate::flows::guard::OperationKind;

/// Convenience alias used across the library.
pub type Result<T, E = IdeaError> = std::result::Result<T, E>;

/// Everything that can go wrong in an IdeaCloud operation.
///
/// None of these are fatal to the process; the CLI prints the message and exits
/// with a non-zero status.
#[derive(Debug, thiserror::Error)]
pub enum IdeaError {
    /// No API credential is configured for the external model.
    #[error("no model credential configured (set OPENAI_API_KEY or model.api_key)")]
    ConfigurationMissing,

    /// The model endpoint could not be reached or kept failing.
    #[error("model request failed: {0}")]
    RequestFailed(String),

    /// The model answered, but not with the expected JSON shape.
    #[error("model response has an unexpected shape: {0}")]
    ResponseShapeInvalid(String),

    /// There are no fragments to analyze.
    #[error("no fragments to analyze yet; capture a few ideas first")]
    NoFragments,

    /// Fragments exist but every text is blank.
    #[error("every fragment text is empty; nothing to analyze")]
    EmptyText,

    /// An import file is not a JSON array.
    #[error("import file could not be parsed: {0}")]
    ImportParseFailure(String),

    /// The same kind of operation is already running.
    #[error("another {0} operation is already in progress")]
    OperationInProgress(OperationKind),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl IdeaError {
    /// True for the two "nothing to analyze" conditions.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::NoFragments | Self::EmptyText)
    }
}
