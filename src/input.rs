//! Input events for the dashboard, read as newline-delimited JSON.
//!
//! Each line is one event object such as `{"event":"next"}`. Stdout stays
//! reserved for rendered frames; diagnostics go to stderr through tracing.

use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::thread::JoinHandle;
use tokio::sync::mpsc;

/// A user or environment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    /// Step forward one item.
    Next,
    /// Step back one item.
    Previous,
    /// The refresh key went down (repeats while held are ignored).
    PressStart,
    /// The refresh key went up.
    PressEnd,
    /// The display lost focus.
    Blur,
    /// The display was hidden.
    Hidden,
    /// Shut the dashboard down.
    Quit,
}

/// Read events from stdin on a dedicated thread.
///
/// A blocking stdin read cannot be cancelled, so it stays off the runtime.
/// The process can exit while the thread is still parked in a read.
pub fn spawn_stdin_reader(tx: mpsc::Sender<InputEvent>) -> Result<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("goalboard-input".to_owned())
        .spawn(move || {
            if let Err(e) = forward_events(std::io::stdin().lock(), &tx) {
                tracing::warn!("input reader stopped: {e}");
            }
        })?;
    Ok(handle)
}

/// Forward events from `reader` to `tx` until EOF, a `quit` event, or the
/// receiver going away. Malformed lines are logged and skipped.
///
/// Blocks the calling thread; never call it from inside the runtime.
pub fn forward_events<R: BufRead>(reader: R, tx: &mpsc::Sender<InputEvent>) -> Result<()> {
    for line in reader.lines() {
        let line = line.map_err(|e| BoardError::Channel(format!("failed to read from stdin: {e}")))?;
        let Some(event) = parse_event(&line) else {
            continue;
        };
        if tx.blocking_send(event).is_err() {
            tracing::debug!("input receiver dropped; stopping reader");
            return Ok(());
        }
        if event == InputEvent::Quit {
            break;
        }
    }
    tracing::debug!("input stream finished");
    Ok(())
}

fn parse_event(line: &str) -> Option<InputEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(error = %e, raw_line = %trimmed, "ignoring malformed input event");
            None
        }
    }
}
