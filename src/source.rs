//! Remote card sources.
//!
//! The dashboard holds its source as `Arc<dyn CardSource>` so a fetch can
//! run on a spawned task while the event loop keeps ticking.

use crate::error::Result;
use crate::item::{Card, Checklist, ChecklistItem, Label, Member};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goalboard_trello::{TrelloCard, TrelloClient, TrelloConfig};
use tracing::debug;

/// Fetches the current list of board cards.
///
/// A failed per-card detail lookup must yield the card without that
/// detail; only a failure of the list itself is an error.
#[async_trait]
pub trait CardSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Card>>;
}

/// Cards from one Trello list.
pub struct TrelloSource {
    client: TrelloClient,
}

impl TrelloSource {
    pub fn new(config: TrelloConfig) -> Result<Self> {
        Ok(Self {
            client: TrelloClient::new(config)?,
        })
    }
}

#[async_trait]
impl CardSource for TrelloSource {
    async fn fetch(&self) -> Result<Vec<Card>> {
        let raw = self.client.fetch_cards().await?;
        debug!(list = self.client.list_id(), cards = raw.len(), "fetched Trello cards");
        Ok(raw.into_iter().map(Card::from).collect())
    }
}

impl From<TrelloCard> for Card {
    fn from(raw: TrelloCard) -> Self {
        let due_at = raw.due.as_deref().and_then(parse_due);
        Self {
            title: raw.name,
            description: raw.desc,
            labels: raw
                .labels
                .into_iter()
                .map(|l| Label {
                    name: l.name,
                    color: l.color,
                })
                .collect(),
            due_at,
            members: raw
                .members
                .into_iter()
                .map(|m| Member {
                    name: m.full_name,
                    avatar_url: m.avatar_url,
                })
                .collect(),
            checklists: raw
                .checklists
                .into_iter()
                .map(|c| Checklist {
                    title: c.name,
                    items: c
                        .check_items
                        .into_iter()
                        .map(|i| ChecklistItem {
                            complete: i.is_complete(),
                            text: i.name,
                        })
                        .collect(),
                })
                .collect(),
            is_simple: false,
        }
    }
}

/// An unparseable due date is dropped rather than failing the card.
fn parse_due(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(due) => Some(due.with_timezone(&Utc)),
        Err(e) => {
            debug!(due = raw, "ignoring unparseable due date: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use goalboard_trello::{TrelloCheckItem, TrelloChecklist, TrelloLabel, TrelloMember};

    #[test]
    fn converts_trello_card() {
        let raw = TrelloCard {
            id: "c1".into(),
            name: "Launch".into(),
            desc: "Ship it".into(),
            labels: vec![TrelloLabel {
                name: "urgent".into(),
                color: Some("red".into()),
            }],
            due: Some("2026-10-20T09:00:00.000Z".into()),
            members: vec![TrelloMember {
                full_name: "Sam Doe".into(),
                avatar_url: None,
            }],
            id_checklists: vec!["k1".into()],
            checklists: vec![TrelloChecklist {
                id: "k1".into(),
                name: "Steps".into(),
                check_items: vec![
                    TrelloCheckItem {
                        name: "Docs".into(),
                        state: "complete".into(),
                    },
                    TrelloCheckItem {
                        name: "Blog".into(),
                        state: "incomplete".into(),
                    },
                ],
            }],
        };

        let card = Card::from(raw);
        assert_eq!(card.title, "Launch");
        assert!(!card.is_simple);
        assert_eq!(card.labels[0].color.as_deref(), Some("red"));
        assert_eq!(card.members[0].name, "Sam Doe");
        assert_eq!(card.checklists[0].progress(), (1, 2));
        assert_eq!(
            card.due_at.unwrap().to_rfc3339(),
            "2026-10-20T09:00:00+00:00"
        );
    }

    #[test]
    fn bad_due_date_is_dropped() {
        let raw = TrelloCard {
            name: "No date".into(),
            due: Some("next tuesday".into()),
            ..Default::default()
        };
        assert!(Card::from(raw).due_at.is_none());
    }
}
