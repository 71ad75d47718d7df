use thiserror::Error;

/// Classified failure of a remote call or a store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Transport failure or timeout.
    #[error("Network error: {0}")]
    Network(String),
    /// The response body did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decoding(String),
    /// The envelope reported `success: false` with a human-readable reason.
    #[error("{}", server_message(.0))]
    Server(String),
    /// Non-2xx status with an envelope failure message.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    /// The operation was superseded. Never surfaced to the view.
    #[error("operation superseded")]
    Cancelled,
    /// A toggle was requested for an entity no tracked list holds.
    #[error("no loaded copy of {0}")]
    UnknownEntity(String),
    /// Input refused before any request was made.
    #[error("{0}")]
    Rejected(String),
}

fn server_message(message: &str) -> &str {
    if message.is_empty() {
        "Server error."
    } else {
        message
    }
}

impl SyncError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SyncError::Cancelled)
    }

    /// Message suitable for `last_error`, or `None` for errors that must stay silent.
    pub fn display_message(&self) -> Option<String> {
        if self.is_cancellation() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decoding(err.to_string())
    }
}
