//! Display items: task cards, goal text and stored photos.
//!
//! Items are shared behind [`Arc`] so rebuilding the rotation queue after a
//! refresh never copies card text or inline photo data.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Label name that suppresses the card title when present.
const NO_TITLE_LABEL: &str = "no title";

/// Cards due within this many days (rounded up) count as due soon.
const DUE_SOON_DAYS: i64 = 2;

static COVER_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Cover:\s*\[?(https?://[^\s\[\]()]+)").expect("valid cover regex")
});

static COVER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)Cover:\s*\[?https?://[^\s\[\]()]+\]?(\([^)]*\))?(\s*"[^"]*")?(\s*\))?"#)
        .expect("valid cover line regex")
});

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]]*\]\(https?://[^)]+\)").expect("valid markdown link regex")
});

static BARE_PAREN_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*https?://[^)]+\s*\)").expect("valid url regex"));

/// One entry of the rotation queue.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueItem {
    /// A task card or a plain goal.
    Card(Arc<Card>),
    /// A stored photo.
    Photo(Arc<Photo>),
}

impl QueueItem {
    /// Short human-readable name, used in logs.
    pub fn label(&self) -> &str {
        match self {
            Self::Card(card) => &card.title,
            Self::Photo(photo) => &photo.name,
        }
    }
}

/// A task-board card. Goal text is a card with `is_simple` set and only a
/// title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    pub title: String,
    pub description: String,
    pub labels: Vec<Label>,
    pub due_at: Option<DateTime<Utc>>,
    pub members: Vec<Member>,
    pub checklists: Vec<Checklist>,
    pub is_simple: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    /// Board colour name; `None` for colourless labels.
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checklist {
    pub title: String,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistItem {
    pub text: String,
    pub complete: bool,
}

/// A stored photo with its image inlined as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub name: String,
    pub data_url: String,
    pub added_at: DateTime<Utc>,
}

/// How close a card's due date is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    /// The due time has passed.
    Overdue,
    /// Due within two days.
    DueSoon,
    /// Due later than that.
    Upcoming,
}

impl Card {
    /// A goal card carrying only `title`.
    pub fn simple(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_simple: true,
            ..Default::default()
        }
    }

    /// Whether a "No Title" label asks for the title to be hidden.
    pub fn hides_title(&self) -> bool {
        !self.is_simple && self.labels.iter().any(Label::is_no_title)
    }

    /// Labels to show, without the "No Title" marker label.
    pub fn visible_labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter().filter(|label| !label.is_no_title())
    }

    /// Due status relative to `now`, or `None` without a due date.
    pub fn due_status(&self, now: DateTime<Utc>) -> Option<DueStatus> {
        let due = self.due_at?;
        let remaining = due - now;
        let millis = remaining.num_milliseconds();
        if millis < 0 {
            return Some(DueStatus::Overdue);
        }
        let day_millis = 24 * 60 * 60 * 1000;
        let days = (millis + day_millis - 1) / day_millis;
        if days <= DUE_SOON_DAYS {
            Some(DueStatus::DueSoon)
        } else {
            Some(DueStatus::Upcoming)
        }
    }

    /// Background image named by a `Cover: <url>` line in the description.
    pub fn cover_url(&self) -> Option<&str> {
        if self.is_simple {
            return None;
        }
        COVER_URL
            .captures(&self.description)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Description without the cover line and without inline links.
    pub fn display_description(&self) -> String {
        if self.is_simple {
            return self.description.clone();
        }
        let without_cover = COVER_LINE.replace(&self.description, "");
        let without_links = MARKDOWN_LINK.replace_all(without_cover.trim(), "");
        BARE_PAREN_URL
            .replace_all(without_links.trim(), "")
            .trim()
            .to_owned()
    }
}

impl Label {
    fn is_no_title(&self) -> bool {
        self.name.trim().eq_ignore_ascii_case(NO_TITLE_LABEL)
    }
}

impl Checklist {
    /// `(completed, total)` item counts.
    pub fn progress(&self) -> (usize, usize) {
        let done = self.items.iter().filter(|item| item.complete).count();
        (done, self.items.len())
    }
}

/// Goal strings as simple cards, skipping blank entries.
pub fn goal_cards(goals: &[String]) -> Vec<Card> {
    goals
        .iter()
        .map(|goal| goal.trim())
        .filter(|goal| !goal.is_empty())
        .map(Card::simple)
        .collect()
}
