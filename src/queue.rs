//! The rotation queue: cards and photos merged into one ordered sequence
//! with a cursor that survives rebuilds.
//!
//! The queue is never edited in place. Replacing either source list
//! produces a fresh sequence and re-clamps the cursor in the same call, so
//! a reader never sees a cursor computed against a different sequence.

use crate::item::{Card, Photo, QueueItem};
use std::sync::Arc;
use tracing::debug;

/// Interleave `cards` and `photos` index by index (card₀, photo₀, card₁,
/// photo₁, …), then append the remainder of the longer list.
pub fn rebuild(cards: &[Arc<Card>], photos: &[Arc<Photo>]) -> Vec<QueueItem> {
    let mut items = Vec::with_capacity(cards.len() + photos.len());
    let mut cards = cards.iter();
    let mut photos = photos.iter();
    loop {
        let card = cards.next();
        let photo = photos.next();
        if card.is_none() && photo.is_none() {
            break;
        }
        if let Some(card) = card {
            items.push(QueueItem::Card(Arc::clone(card)));
        }
        if let Some(photo) = photo {
            items.push(QueueItem::Photo(Arc::clone(photo)));
        }
    }
    items
}

/// `cursor` if it addresses an item of a queue of `len` items, else 0.
pub fn clamp_cursor(cursor: usize, len: usize) -> usize {
    if cursor < len { cursor } else { 0 }
}

/// The item under `cursor`, or `None` for an empty queue.
pub fn current_item(queue: &[QueueItem], cursor: usize) -> Option<&QueueItem> {
    queue.get(clamp_cursor(cursor, queue.len()))
}

/// Both source lists, the interleaved sequence built from them, and the
/// cursor into that sequence.
#[derive(Debug, Clone, Default)]
pub struct RotationQueue {
    cards: Vec<Arc<Card>>,
    photos: Vec<Arc<Photo>>,
    items: Vec<QueueItem>,
    cursor: usize,
}

impl RotationQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn from_sources(cards: Vec<Card>, photos: Vec<Photo>) -> Self {
        let mut queue = Self::new();
        queue.replace(Some(cards), Some(photos));
        queue
    }

    /// Replace whichever lists are given and rebuild once, so the cursor is
    /// only clamped against the final sequence.
    pub fn replace(&mut self, cards: Option<Vec<Card>>, photos: Option<Vec<Photo>>) {
        if cards.is_none() && photos.is_none() {
            return;
        }
        if let Some(cards) = cards {
            self.cards = cards.into_iter().map(Arc::new).collect();
        }
        if let Some(photos) = photos {
            self.photos = photos.into_iter().map(Arc::new).collect();
        }
        self.rebuild_items();
    }

    /// Move the cursor. Out-of-range positions clamp to 0.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = clamp_cursor(cursor, self.items.len());
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Nothing to show: no cards and no photos.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cards(&self) -> &[Arc<Card>] {
        &self.cards
    }

    pub fn photos(&self) -> &[Arc<Photo>] {
        &self.photos
    }

    /// The item under the cursor, `None` when empty.
    pub fn current(&self) -> Option<&QueueItem> {
        current_item(&self.items, self.cursor)
    }

    fn rebuild_items(&mut self) {
        self.items = rebuild(&self.cards, &self.photos);
        let clamped = clamp_cursor(self.cursor, self.items.len());
        if clamped != self.cursor {
            debug!(
                cursor = self.cursor,
                len = self.items.len(),
                "cursor out of range after rebuild; reset to start"
            );
        }
        self.cursor = clamped;
    }
}
