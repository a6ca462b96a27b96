//! Error types for the goalboard display.

/// Top-level error type for the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote card source could not be reached or returned garbage.
    #[error("card source unavailable: {0}")]
    SourceUnavailable(String),

    /// Photo store read or write error.
    #[error("photo store error: {0}")]
    PhotoStore(String),

    /// Malformed input event or CLI argument.
    #[error("input error: {0}")]
    Input(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),
}

impl From<goalboard_trello::TrelloError> for BoardError {
    fn from(e: goalboard_trello::TrelloError) -> Self {
        match e {
            goalboard_trello::TrelloError::Config(msg) => Self::Config(msg),
            other => Self::SourceUnavailable(other.to_string()),
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BoardError>;
