//! Shared HTTP client for Trello requests.

use crate::config::TrelloConfig;
use crate::error::TrelloError;
use std::time::Duration;

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("goalboard/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] configured for the Trello API.
///
/// # Errors
///
/// Returns [`TrelloError::Http`] if the client cannot be constructed.
pub fn build_client(config: &TrelloConfig) -> Result<reqwest::Client, TrelloError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| TrelloError::Http(format!("failed to build HTTP client: {e}")))
}
