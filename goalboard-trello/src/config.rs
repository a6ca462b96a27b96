//! Client configuration for one Trello list.

use crate::error::TrelloError;

/// Default Trello REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.trello.com";

/// Where to fetch cards from and how to authenticate.
#[derive(Clone)]
pub struct TrelloConfig {
    /// Trello list whose cards are displayed.
    pub list_id: String,
    /// Developer API key.
    pub api_key: String,
    /// User token authorising read access to the board.
    pub token: String,
    /// API origin. Overridden in tests to point at a mock server.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl TrelloConfig {
    /// Create a config for `list_id` against the public Trello API.
    pub fn new(
        list_id: impl Into<String>,
        api_key: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            list_id: list_id.into(),
            api_key: api_key.into(),
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: 15,
        }
    }

    /// Set a custom API origin.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Validates this configuration.
    ///
    /// Checks that the list id, key and token are non-blank, the timeout is
    /// non-zero, and the base URL parses.
    pub fn validate(&self) -> Result<(), TrelloError> {
        if self.list_id.trim().is_empty() {
            return Err(TrelloError::Config("list_id must not be empty".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(TrelloError::Config("api_key must not be empty".into()));
        }
        if self.token.trim().is_empty() {
            return Err(TrelloError::Config("token must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(TrelloError::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| TrelloError::Config(format!("invalid base_url: {e}")))?;
        Ok(())
    }
}

// Credentials stay out of debug output.
impl std::fmt::Debug for TrelloConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrelloConfig")
            .field("list_id", &self.list_id)
            .field("api_key", &"<redacted>")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
