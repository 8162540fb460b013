//! Error types module
//!
//! All client failures are reported through [`WeedError`]. Nothing in the
//! workspace retries on its own; callers that want retry/backoff or
//! re-resolution after a volume move should branch on
//! [`WeedError::is_retryable`].

use std::time::Duration;

/// Boxed source error carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum WeedError {
    #[error("Volume {0} does not exist on seaweed or could not be found")]
    NoVolumeFound(u32),

    #[error("Volume {0} has no volume server location")]
    NoVolumeServerFound(u32),

    #[error("Item {0} does not exist on seaweed or could not be found")]
    NoFileFound(String),

    #[error("Failed to delete item {0} from seaweed")]
    DeleteFailed(String),

    #[error("Tags must start with Seaweed- Invalid tags provided: {}", .0.join(","))]
    InvalidTag(Vec<String>),

    #[error("Malformed file identifier: {0}")]
    MalformedIdentifier(String),

    #[error("Transfer failed: {message}")]
    TransferFailed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for client operations
pub type WeedResult<T> = Result<T, WeedError>;

impl WeedError {
    /// Transport/protocol failure without an underlying error value.
    pub fn transfer(message: impl Into<String>) -> Self {
        WeedError::TransferFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Transport/protocol failure wrapping the error that caused it.
    pub fn transfer_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        WeedError::TransferFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Machine-readable error code (e.g., "NO_FILE_FOUND")
    pub fn error_code(&self) -> &'static str {
        match self {
            WeedError::NoVolumeFound(_) => "NO_VOLUME_FOUND",
            WeedError::NoVolumeServerFound(_) => "NO_VOLUME_SERVER_FOUND",
            WeedError::NoFileFound(_) => "NO_FILE_FOUND",
            WeedError::DeleteFailed(_) => "DELETE_FAILED",
            WeedError::InvalidTag(_) => "INVALID_TAG",
            WeedError::MalformedIdentifier(_) => "MALFORMED_IDENTIFIER",
            WeedError::TransferFailed { .. } => "TRANSFER_FAILED",
            WeedError::Cancelled => "CANCELLED",
            WeedError::Timeout(_) => "TIMEOUT",
            WeedError::InvalidInput(_) => "INVALID_INPUT",
            WeedError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Whether repeating the same call could succeed.
    ///
    /// Lookup misses are included because a volume that is moving between
    /// servers can be missing from the master for a short window.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WeedError::NoVolumeFound(_)
                | WeedError::NoVolumeServerFound(_)
                | WeedError::TransferFailed { .. }
                | WeedError::Timeout(_)
        )
    }
}
