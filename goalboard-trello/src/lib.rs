//! # goalboard-trello
//!
//! Read-only Trello client used by goalboard to pull the cards of one list,
//! including each card's labels, members, due date and checklists.
//!
//! ## Design
//!
//! - One list call followed by concurrent per-checklist lookups
//! - Partial results: a failed checklist lookup keeps the card without it,
//!   a malformed card is skipped instead of failing the list
//! - Credentials travel only in the query string and never appear in logs,
//!   error messages, or `Debug` output
//!
//! ```no_run
//! # async fn example() -> goalboard_trello::Result<()> {
//! use goalboard_trello::{TrelloClient, TrelloConfig};
//!
//! let client = TrelloClient::new(TrelloConfig::new("list-id", "api-key", "token"))?;
//! for card in client.fetch_cards().await? {
//!     println!("{}", card.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::TrelloClient;
pub use config::TrelloConfig;
pub use error::{Result, TrelloError};
pub use types::{TrelloCard, TrelloCheckItem, TrelloChecklist, TrelloLabel, TrelloMember};
