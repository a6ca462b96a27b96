//! Error types for the goalboard-trello crate.
//!
//! Messages never contain the API key, token, or full request URL.

/// Errors that can occur while talking to the Trello REST API.
#[derive(Debug, thiserror::Error)]
pub enum TrelloError {
    /// The request could not be sent or the connection failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Trello answered with a non-success status code.
    #[error("Trello API error: {status} {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Short response body excerpt.
        body: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for goalboard-trello results.
pub type Result<T> = std::result::Result<T, TrelloError>;

impl From<reqwest::Error> for TrelloError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest includes the request URL in its Display output, and ours
        // carries the token in the query string.
        TrelloError::Http(e.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_status() {
        let err = TrelloError::Status {
            status: 401,
            body: "invalid token".into(),
        };
        assert_eq!(err.to_string(), "Trello API error: 401 invalid token");
    }

    #[test]
    fn display_parse() {
        let err = TrelloError::Parse("expected array".into());
        assert_eq!(err.to_string(), "parse error: expected array");
    }

    #[test]
    fn display_config() {
        let err = TrelloError::Config("list_id must not be empty".into());
        assert_eq!(err.to_string(), "config error: list_id must not be empty");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TrelloError>();
    }
}
