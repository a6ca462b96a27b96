//! Rendering capability handed to the dashboard, and a plain-text renderer.

use crate::clock::ClockReading;
use crate::gesture::GestureView;
use crate::item::{Card, DueStatus, Photo, QueueItem};
use chrono::{DateTime, Utc};
use std::io::Write;

/// Shown when there are no cards, goals or photos.
pub const EMPTY_PLACEHOLDER: &str =
    "No cards found. Configure a Trello list (list_id, api_key, token) or add goals.";

/// Everything the dashboard draws goes through this trait.
///
/// Only [`render`](Renderer::render) is required. The other hooks default
/// to doing nothing so a renderer can ignore what it cannot show.
pub trait Renderer: Send {
    /// Show `item`, or the empty-state placeholder for `None`.
    fn render(&mut self, item: Option<&QueueItem>);

    fn render_clock(&mut self, _reading: &ClockReading) {}

    fn render_auto_refresh(&mut self, _enabled: bool) {}

    fn render_gesture(&mut self, _view: GestureView) {}

    /// Transient status message, e.g. a failed refresh.
    fn render_notice(&mut self, _message: &str) {}
}

/// Writes one text frame per render to `W`.
pub struct TextRenderer<W: Write + Send> {
    out: W,
    /// Last hold progress printed, in tenths.
    hold_step: Option<u32>,
}

impl<W: Write + Send> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            hold_step: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_text(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            tracing::warn!("render output failed: {e}");
        }
    }
}

impl<W: Write + Send> Renderer for TextRenderer<W> {
    fn render(&mut self, item: Option<&QueueItem>) {
        let frame = frame(item, Utc::now());
        self.write_text(&frame);
    }

    fn render_clock(&mut self, reading: &ClockReading) {
        let line = format!("[clock] {}, {} {}\n", reading.weekday, reading.date, reading.time);
        self.write_text(&line);
    }

    fn render_auto_refresh(&mut self, enabled: bool) {
        let state = if enabled { "on" } else { "off" };
        self.write_text(&format!("[auto-refresh] {state}\n"));
    }

    fn render_gesture(&mut self, view: GestureView) {
        let line = match view {
            GestureView::Hidden => {
                self.hold_step = None;
                return;
            }
            GestureView::Holding { progress, remaining } => {
                // Samples arrive every few milliseconds; print each tenth once.
                let step = (progress * 10.0).floor() as u32;
                if self.hold_step == Some(step) {
                    return;
                }
                self.hold_step = Some(step);
                format!(
                    "[hold] {:>3}% ({:.1}s to toggle auto-refresh)\n",
                    step * 10,
                    remaining.as_secs_f32()
                )
            }
            GestureView::Completed => {
                if self.hold_step == Some(u32::MAX) {
                    return;
                }
                self.hold_step = Some(u32::MAX);
                "[hold] toggling auto-refresh\n".to_owned()
            }
        };
        self.write_text(&line);
    }

    fn render_notice(&mut self, message: &str) {
        self.write_text(&format!("[notice] {message}\n"));
    }
}

/// The text frame for `item` as of `now`.
pub fn frame(item: Option<&QueueItem>, now: DateTime<Utc>) -> String {
    let mut out = String::from("----\n");
    match item {
        None => {
            out.push_str(EMPTY_PLACEHOLDER);
            out.push('\n');
        }
        Some(QueueItem::Card(card)) => card_frame(&mut out, card, now),
        Some(QueueItem::Photo(photo)) => photo_frame(&mut out, photo),
    }
    out
}

fn card_frame(out: &mut String, card: &Card, now: DateTime<Utc>) {
    if card.is_simple {
        out.push_str(&card.title);
        out.push('\n');
        return;
    }

    if !card.hides_title() {
        out.push_str(&card.title);
        out.push('\n');
    }

    let labels: Vec<&str> = card
        .visible_labels()
        .map(|l| match (l.name.trim(), l.color.as_deref()) {
            ("", Some(color)) => color,
            (name, _) => name,
        })
        .filter(|name| !name.is_empty())
        .collect();
    if !labels.is_empty() {
        out.push_str(&format!("Labels: {}\n", labels.join(", ")));
    }

    if let (Some(due), Some(status)) = (card.due_at, card.due_status(now)) {
        let prefix = match status {
            DueStatus::Overdue => "Overdue",
            DueStatus::DueSoon => "Due soon",
            DueStatus::Upcoming => "Due",
        };
        out.push_str(&format!("{prefix}: {}\n", due.format("%b %-d, %Y")));
    }

    if !card.members.is_empty() {
        let names: Vec<&str> = card.members.iter().map(|m| m.name.as_str()).collect();
        out.push_str(&format!("Members: {}\n", names.join(", ")));
    }

    if let Some(cover) = card.cover_url() {
        out.push_str(&format!("Cover: {cover}\n"));
    }

    let description = card.display_description();
    if !description.is_empty() {
        out.push_str(&description);
        out.push('\n');
    }

    for checklist in &card.checklists {
        let (done, total) = checklist.progress();
        out.push_str(&format!("{} ({done}/{total})\n", checklist.title));
        for item in &checklist.items {
            let mark = if item.complete { 'x' } else { ' ' };
            out.push_str(&format!("  [{mark}] {}\n", item.text));
        }
    }
}

fn photo_frame(out: &mut String, photo: &Photo) {
    out.push_str(&format!(
        "Photo: {} (added {})\n",
        photo.name,
        photo.added_at.format("%b %-d, %Y")
    ));
}
