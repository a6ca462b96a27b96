//! Wire types for the subset of the Trello REST API goalboard reads.
//!
//! Every field is defaulted so a card with missing or `null` fields still
//! deserializes; the display falls back to empty values instead of dropping
//! the whole list.

use serde::{Deserialize, Deserializer, Serialize};

/// A card as returned by `GET /1/lists/{id}/cards`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrelloCard {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub desc: String,
    #[serde(deserialize_with = "null_as_default")]
    pub labels: Vec<TrelloLabel>,
    /// RFC 3339 due timestamp.
    pub due: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub members: Vec<TrelloMember>,
    #[serde(deserialize_with = "null_as_default")]
    pub id_checklists: Vec<String>,
    /// Inline checklists (present when requested with `checklists=all`);
    /// merged by id with the per-checklist lookups.
    #[serde(deserialize_with = "null_as_default")]
    pub checklists: Vec<TrelloChecklist>,
}

/// A coloured card label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrelloLabel {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Trello colour name (`green`, `sky`, ...); `null` for colourless labels.
    pub color: Option<String>,
}

/// A board member assigned to a card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrelloMember {
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
    /// Avatar base URL; Trello serves sized variants under `{url}/{size}.png`.
    pub avatar_url: Option<String>,
}

/// A checklist as returned by `GET /1/checklists/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrelloChecklist {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub check_items: Vec<TrelloCheckItem>,
}

/// One checklist entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrelloCheckItem {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// `complete` or `incomplete`.
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
}

impl TrelloCheckItem {
    /// Whether the item is ticked.
    pub fn is_complete(&self) -> bool {
        self.state == "complete"
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
