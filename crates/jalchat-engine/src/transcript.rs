//! The transcript: an ordered, append-only render list.
//!
//! The view layer observes the entries and reflects them. Appending a
//! message always snaps the view back to the newest entry.
//!
//! The pending indicator lives in the same list as a marked placeholder so
//! that it shows up in order after the user's message. It is found by its
//! marker, never by position, and at most one exists at any time.

use crate::message::{Message, Sender};
use std::fmt::Write;
use tracing::debug;
use uuid::Uuid;

/// Marker identifying the pending-response placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingMarker(Uuid);

impl PendingMarker {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PendingMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pending-{}", self.0)
    }
}

/// One entry in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A rendered message.
    Message(Message),
    /// The "bot is responding" placeholder.
    Pending(PendingMarker),
}

impl Entry {
    /// The message, if this entry is one.
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message(msg) => Some(msg),
            Self::Pending(_) => None,
        }
    }
}

/// Ordered list of rendered messages plus the pending indicator.
#[derive(Debug, Clone)]
pub struct Transcript {
    entries: Vec<Entry>,
    /// Lines scrolled back from the bottom (0 = showing latest).
    scroll_back: usize,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            scroll_back: 0,
        }
    }

    /// Append a message and scroll to it.
    pub fn render(&mut self, sender: Sender, text: impl Into<String>, image_url: Option<String>) {
        self.push(Message::new(sender, text, image_url));
    }

    /// Append an already built message and scroll to it.
    pub fn push(&mut self, message: Message) {
        debug!(sender = %message.sender, chars = message.char_count(), "rendering message");
        self.entries.push(Entry::Message(message));
        self.scroll_to_end();
    }

    /// Show the pending indicator and scroll to it.
    ///
    /// If an indicator is already showing, its marker is returned and no
    /// second placeholder is inserted.
    pub fn show_pending(&mut self) -> PendingMarker {
        if let Some(marker) = self.pending_marker() {
            debug!(%marker, "pending indicator already showing");
            return marker;
        }
        let marker = PendingMarker::new();
        self.entries.push(Entry::Pending(marker));
        self.scroll_to_end();
        marker
    }

    /// Remove the pending indicator if present.
    ///
    /// Returns whether an indicator was removed. Calling this with no
    /// indicator showing is a no-op.
    pub fn remove_pending(&mut self) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| !matches!(entry, Entry::Pending(_)));
        before != self.entries.len()
    }

    /// Marker of the pending indicator, if one is showing.
    pub fn pending_marker(&self) -> Option<PendingMarker> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Pending(marker) => Some(*marker),
            Entry::Message(_) => None,
        })
    }

    /// Whether the pending indicator is showing.
    pub fn has_pending(&self) -> bool {
        self.pending_marker().is_some()
    }

    /// Number of pending indicators in the transcript (0 or 1).
    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Entry::Pending(_)))
            .count()
    }

    /// All entries in order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Rendered messages in order, skipping the pending indicator.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(Entry::as_message)
    }

    /// Number of rendered messages.
    pub fn message_count(&self) -> usize {
        self.messages().count()
    }

    /// The most recent bot message.
    pub fn last_bot_message(&self) -> Option<&Message> {
        self.entries
            .iter()
            .rev()
            .filter_map(Entry::as_message)
            .find(|m| m.sender == Sender::Bot)
    }

    /// Check if the transcript has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines scrolled back from the bottom.
    pub fn scroll_back(&self) -> usize {
        self.scroll_back
    }

    /// Whether the view follows the newest entry.
    pub fn is_following(&self) -> bool {
        self.scroll_back == 0
    }

    /// Scroll towards older entries by `lines`.
    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_add(lines);
    }

    /// Scroll towards newer entries by `lines`.
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    /// Clamp the scroll position to what the view can actually show.
    pub fn clamp_scroll(&mut self, max_back: usize) {
        self.scroll_back = self.scroll_back.min(max_back);
    }

    /// Jump back to the newest entry.
    pub fn scroll_to_end(&mut self) {
        self.scroll_back = 0;
    }

    /// Plain-text rendering, one `Label: text` block per message.
    ///
    /// Continuation lines are indented under the label, and images are
    /// listed on their own line.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            if !out.is_empty() {
                out.push('\n');
            }
            match entry {
                Entry::Message(msg) => {
                    let label = msg.sender.label();
                    let indent = " ".repeat(label.len() + 2);
                    let text = msg.display_text();
                    for (i, line) in text.split('\n').enumerate() {
                        if i == 0 {
                            let _ = write!(out, "{label}: {line}");
                        } else {
                            let _ = write!(out, "\n{indent}{line}");
                        }
                    }
                    if let Some(url) = &msg.image_url {
                        let _ = write!(out, "\n{indent}[image] {url}");
                    }
                }
                Entry::Pending(_) => {
                    let _ = write!(out, "{}: ...", Sender::Bot.label());
                }
            }
        }
        out
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
