//! Trello list client.
//!
//! Fetching a list is two dependent steps: the card list, then one
//! checklist lookup per checklist id on each card. The lookups run
//! concurrently and a failed lookup never fails the batch.

use crate::config::TrelloConfig;
use crate::error::{Result, TrelloError};
use crate::http::build_client;
use crate::types::{TrelloCard, TrelloChecklist};
use futures::future::join_all;
use tracing::{debug, warn};
use url::Url;

/// Longest response body excerpt kept in a [`TrelloError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Reads the cards of one Trello list.
#[derive(Debug, Clone)]
pub struct TrelloClient {
    config: TrelloConfig,
    http: reqwest::Client,
}

impl TrelloClient {
    /// Create a client after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TrelloError::Config`] for an invalid config, or
    /// [`TrelloError::Http`] if the HTTP client cannot be built.
    pub fn new(config: TrelloConfig) -> Result<Self> {
        config.validate()?;
        let http = build_client(&config)?;
        Ok(Self { config, http })
    }

    /// The list this client reads.
    pub fn list_id(&self) -> &str {
        &self.config.list_id
    }

    /// Fetch every card on the list together with its checklists.
    ///
    /// Cards that do not match the expected JSON shape are skipped with a
    /// warning. Checklist lookups that fail leave the card with whatever
    /// inline checklist data the list call returned.
    ///
    /// # Errors
    ///
    /// Returns an error only when the list call itself fails.
    pub async fn fetch_cards(&self) -> Result<Vec<TrelloCard>> {
        let mut url = self.endpoint(&["lists", self.config.list_id.as_str(), "cards"])?;
        url.query_pairs_mut()
            .append_pair("fields", "all")
            .append_pair("members", "true")
            .append_pair("member_fields", "all")
            .append_pair("checklists", "all");

        let raw: Vec<serde_json::Value> = self.get_json(url).await?;
        let mut cards: Vec<TrelloCard> = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(card) => Some(card),
                Err(e) => {
                    warn!(index, error = %e, "skipping malformed Trello card");
                    None
                }
            })
            .collect();

        let lookups = cards.iter().map(|card| self.fetch_checklists(card));
        let resolved = join_all(lookups).await;
        for (card, checklists) in cards.iter_mut().zip(resolved) {
            if let Some(checklists) = checklists {
                card.checklists = checklists;
            }
        }

        debug!(count = cards.len(), "fetched Trello cards");
        Ok(cards)
    }

    /// Fetch a single checklist by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    pub async fn fetch_checklist(&self, checklist_id: &str) -> Result<TrelloChecklist> {
        let url = self.endpoint(&["checklists", checklist_id])?;
        self.get_json(url).await
    }

    /// Resolve all checklists of `card`, in `idChecklists` order. A failed
    /// lookup falls back to the inline checklist with the same id; inline
    /// checklists not named in `idChecklists` are kept at the end. Returns
    /// `None` when the card has no checklist ids.
    async fn fetch_checklists(&self, card: &TrelloCard) -> Option<Vec<TrelloChecklist>> {
        if card.id_checklists.is_empty() {
            return None;
        }

        let results = join_all(
            card.id_checklists
                .iter()
                .map(|id| self.fetch_checklist(id)),
        )
        .await;

        let inline = |id: &str| card.checklists.iter().find(|c| c.id == id).cloned();
        let mut checklists = Vec::with_capacity(results.len());
        for (id, result) in card.id_checklists.iter().zip(results) {
            match result {
                Ok(checklist) => checklists.push(checklist),
                Err(e) => {
                    warn!(
                        card_id = %card.id,
                        checklist_id = %id,
                        error = %e,
                        "checklist lookup failed; using inline data if any"
                    );
                    checklists.extend(inline(id.as_str()));
                }
            }
        }
        checklists.extend(
            card.checklists
                .iter()
                .filter(|c| !card.id_checklists.contains(&c.id))
                .cloned(),
        );
        Some(checklists)
    }

    /// Build `{base}/1/{segments...}?key=..&token=..`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| TrelloError::Config(format!("invalid base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| TrelloError::Config("base_url cannot carry a path".into()))?
            .pop_if_empty()
            .push("1")
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key)
            .append_pair("token", &self.config.token);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let mut excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();
            if excerpt.is_empty() {
                excerpt = status.canonical_reason().unwrap_or("").to_owned();
            }
            return Err(TrelloError::Status {
                status: status.as_u16(),
                body: excerpt,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| TrelloError::Parse(e.to_string()))
    }
}
