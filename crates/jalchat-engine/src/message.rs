//! Chat message types and their display forms.
//!
//! A [`Message`] is created once, when it is rendered into the transcript,
//! and never changes afterwards. The raw text is kept as received; escaping
//! happens on the way out, through [`Message::html_fragment`] for markup
//! views and [`Message::display_text`] for the terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Avatar label shown next to user messages.
pub const USER_LABEL: &str = "You";

/// Avatar label shown next to bot messages.
pub const BOT_LABEL: &str = "JV";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed locally by the user.
    User,
    /// Produced from a backend response or a local failure.
    Bot,
}

impl Sender {
    /// Avatar label for this sender.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => USER_LABEL,
            Self::Bot => BOT_LABEL,
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
        }
    }
}

/// A single rendered chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message.
    pub sender: Sender,
    /// Message text, unescaped.
    pub text: String,
    /// Optional image shown beneath the text (bot messages only).
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// When the message was rendered.
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Create a user message. User messages never carry an image.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            image_url: None,
            sent_at: Utc::now(),
        }
    }

    /// Create a bot message with an optional image.
    ///
    /// An empty image URL is treated as no image.
    pub fn bot(text: impl Into<String>, image_url: Option<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            image_url: image_url.filter(|url| !url.trim().is_empty()),
            sent_at: Utc::now(),
        }
    }

    /// Build a message for `sender`, dropping the image for user messages.
    pub fn new(sender: Sender, text: impl Into<String>, image_url: Option<String>) -> Self {
        match sender {
            Sender::User => Self::user(text),
            Sender::Bot => Self::bot(text, image_url),
        }
    }

    /// Length of the text in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Text safe to write to a terminal.
    ///
    /// Control characters other than newline and tab are replaced with
    /// U+FFFD so response text cannot smuggle escape sequences into the
    /// terminal. Angle brackets and other printable characters are kept
    /// as literal characters.
    pub fn display_text(&self) -> String {
        neutralize_controls(&self.text)
    }

    /// HTML fragment for this message.
    ///
    /// The text is escaped so it always renders as literal characters.
    /// Bot text keeps its line breaks as `<br>`, and an image element is
    /// appended when the message carries an image URL.
    pub fn html_fragment(&self) -> String {
        let escaped = escape_markup(&self.text);
        let mut html = String::new();

        match self.sender {
            Sender::User => {
                let _ = write!(
                    html,
                    r#"<div class="message user"><div class="content"><p>{escaped}</p></div><div class="avatar">{USER_LABEL}</div></div>"#
                );
            }
            Sender::Bot => {
                let body = escaped.replace("\r\n", "\n").replace('\n', "<br>");
                let _ = write!(
                    html,
                    r#"<div class="message bot"><div class="avatar">{BOT_LABEL}</div><div class="content"><p>{body}</p>"#
                );
                if let Some(url) = &self.image_url {
                    let _ = write!(
                        html,
                        r#"<div class="image"><img src="{}" alt="Generated Chart" /></div>"#,
                        escape_attribute(url)
                    );
                }
                html.push_str("</div></div>");
            }
        }

        html
    }
}

/// Escape text for insertion into markup.
///
/// Angle brackets and ampersands are replaced with entities, so the result
/// never contains tags.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a value for a double-quoted markup attribute.
fn escape_attribute(value: &str) -> String {
    escape_markup(value).replace('"', "&quot;")
}

/// Replace terminal control characters, keeping newlines and tabs.
pub fn neutralize_controls(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .map(|ch| {
            if ch.is_control() && ch != '\n' && ch != '\t' {
                '\u{FFFD}'
            } else {
                ch
            }
        })
        .collect()
}
