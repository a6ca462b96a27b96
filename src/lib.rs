//! Goalboard: a rotating display of goals, task-board cards and photos.
//!
//! Cards from a remote list (or plain goal texts) and locally stored photos
//! are interleaved into one rotation queue. A timer advances through it,
//! manual navigation steps through it, and background refreshes replace
//! its contents without losing the cursor.
//!
//! # Architecture
//!
//! - **Sources**: [`source::CardSource`] (Trello via `goalboard-trello`) and
//!   [`photos::PhotoStore`] (a JSONL file)
//! - **Queue**: [`queue::RotationQueue`] merges both lists and owns the cursor
//! - **Controllers**: [`rotation::RotationController`] for auto-advance,
//!   [`refresh::RefreshController`] for polling, generations and the
//!   long-press toggle
//! - **Loop**: [`dashboard::Dashboard`] drives everything from one
//!   `tokio::select!` and hands items to a [`render::Renderer`]

pub mod board_dirs;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gesture;
pub mod input;
pub mod item;
pub mod photos;
pub mod queue;
pub mod refresh;
pub mod render;
pub mod rotation;
pub mod source;

pub use config::BoardConfig;
pub use dashboard::{Dashboard, DashboardSettings};
pub use error::{BoardError, Result};
pub use input::InputEvent;
pub use item::{Card, Photo, QueueItem};
pub use photos::{JsonlPhotoStore, PhotoSelector, PhotoStore};
pub use queue::RotationQueue;
pub use refresh::{RefreshController, RefreshSettings};
pub use render::{Renderer, TextRenderer};
pub use rotation::RotationController;
pub use source::{CardSource, TrelloSource};
