//! Transcript pane.
//!
//! User messages sit against the right edge under a "You" header. Bot
//! messages run down a left gutter under a "JV" header, with an image
//! line when the reply carries one. The pending indicator is a bot entry
//! with animated dots.

use crate::text::{visual_width, wrap_text};
use crate::ui::theme::{pending_dots, Styles, Symbols};
use jalchat_engine::{resolve_image_url, Entry, Message, Sender, Transcript, Url};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Transcript rendered for a given width.
pub struct TranscriptView<'a> {
    transcript: &'a Transcript,
    endpoint: &'a Url,
    tick: usize,
}

impl<'a> TranscriptView<'a> {
    /// Create a view; image references resolve against `endpoint`.
    pub fn new(transcript: &'a Transcript, endpoint: &'a Url, tick: usize) -> Self {
        Self {
            transcript,
            endpoint,
            tick,
        }
    }

    /// All transcript lines at `width`, oldest first.
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (i, entry) in self.transcript.entries().iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            match entry {
                Entry::Message(message) => match message.sender {
                    Sender::User => push_user(&mut lines, message, width),
                    Sender::Bot => self.push_bot(&mut lines, message, width),
                },
                Entry::Pending(_) => {
                    lines.push(Line::from(Span::styled(
                        Sender::Bot.label(),
                        Styles::bot_label(),
                    )));
                    lines.push(Line::from(vec![
                        Span::styled(Symbols::GUTTER, Styles::bot_gutter()),
                        Span::styled(pending_dots(self.tick), Styles::dim()),
                    ]));
                }
            }
        }
        lines
    }

    fn push_bot(&self, lines: &mut Vec<Line<'static>>, message: &Message, width: usize) {
        let inner = width.saturating_sub(visual_width(Symbols::GUTTER));
        lines.push(Line::from(Span::styled(
            Sender::Bot.label(),
            Styles::bot_label(),
        )));
        for row in wrap_text(&message.display_text(), inner) {
            lines.push(Line::from(vec![
                Span::styled(Symbols::GUTTER, Styles::bot_gutter()),
                Span::styled(row, Styles::default()),
            ]));
        }
        if let Some(image_url) = &message.image_url {
            let target = resolve_image_url(self.endpoint, image_url);
            for row in wrap_text(&format!("{} {target}", Symbols::IMAGE), inner) {
                lines.push(Line::from(vec![
                    Span::styled(Symbols::GUTTER, Styles::bot_gutter()),
                    Span::styled(row, Styles::image_link()),
                ]));
            }
        }
    }

    /// Render into `area`, returning how many lines did not fit.
    ///
    /// Following the transcript shows the newest lines; a scroll-back
    /// offset moves the window up, clamped to the overflow.
    #[allow(clippy::cast_possible_truncation)]
    pub fn render_with_overflow(self, area: Rect, buf: &mut Buffer) -> usize {
        let lines = self.lines(usize::from(area.width));
        let overflow = lines.len().saturating_sub(usize::from(area.height));
        let offset = overflow - self.transcript.scroll_back().min(overflow);

        Paragraph::new(lines)
            .style(Styles::default())
            .scroll((offset.min(usize::from(u16::MAX)) as u16, 0))
            .render(area, buf);
        overflow
    }
}

/// Right-align a user message in the leftmost three quarters' width.
fn push_user(lines: &mut Vec<Line<'static>>, message: &Message, width: usize) {
    let wrap_width = (width * 3 / 4).max(1);
    let right = |text: String, style: Style| {
        let pad = width.saturating_sub(visual_width(&text));
        Line::from(vec![Span::raw(" ".repeat(pad)), Span::styled(text, style)])
    };

    lines.push(right(Sender::User.label().to_string(), Styles::user_label()));
    for row in wrap_text(&message.display_text(), wrap_width) {
        lines.push(right(row, Styles::default()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    fn endpoint() -> Url {
        Url::parse("http://127.0.0.1:5000/chat").unwrap()
    }

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_lines_for_exchange() {
        let mut transcript = Transcript::new();
        transcript.render(
            Sender::Bot,
            "Pune is Safe.\nNashik is Critical.",
            Some("/static/a.png".into()),
        );
        transcript.render(Sender::User, "thanks", None);
        transcript.show_pending();

        let url = endpoint();
        let view = TranscriptView::new(&transcript, &url, 1);
        let pad = " ".repeat(50 - 6);
        let user_pad = " ".repeat(50 - 3);

        assert_eq!(
            plain(&view.lines(50)),
            vec![
                "JV".to_string(),
                "│ Pune is Safe.".into(),
                "│ Nashik is Critical.".into(),
                "│ [image] http://127.0.0.1:5000/static/a.png".into(),
                String::new(),
                format!("{user_pad}You"),
                format!("{pad}thanks"),
                String::new(),
                "JV".into(),
                "│ ○ ● ○".into(),
            ]
        );
    }

    #[test]
    fn test_bot_reply_wraps_inside_gutter() {
        let mut transcript = Transcript::new();
        transcript.render(
            Sender::Bot,
            "Groundwater in Pune is Safe while Nashik is Critical.",
            None,
        );
        transcript.show_pending();

        let url = endpoint();
        let lines = plain(&TranscriptView::new(&transcript, &url, 2).lines(30));
        insta::assert_snapshot!(lines.join("\n"), @r"
        JV
        │ Groundwater in Pune is Safe
        │ while Nashik is Critical.

        JV
        │ ○ ○ ●
        ");
    }

    #[test]
    fn test_markup_and_controls_are_shown_literally() {
        let mut transcript = Transcript::new();
        transcript.render(Sender::Bot, "<b>bold</b>\u{1b}[31m", None);

        let url = endpoint();
        let lines = plain(&TranscriptView::new(&transcript, &url, 0).lines(40));
        assert_eq!(lines[1], "│ <b>bold</b>\u{fffd}[31m");
    }

    #[test]
    fn test_long_user_message_wraps() {
        let mut transcript = Transcript::new();
        transcript.render(Sender::User, "one two three four five six seven", None);

        let url = endpoint();
        let lines = plain(&TranscriptView::new(&transcript, &url, 0).lines(20));
        assert!(lines.len() > 2);
        for line in &lines {
            assert_eq!(visual_width(line), 20);
        }
    }

    #[test]
    fn test_render_follows_newest_lines() {
        let mut transcript = Transcript::new();
        for i in 0..5 {
            transcript.render(Sender::Bot, format!("reply {i}"), None);
        }

        let url = endpoint();
        let area = Rect::new(0, 0, 30, 4);
        let mut buf = Buffer::empty(area);
        let overflow =
            TranscriptView::new(&transcript, &url, 0).render_with_overflow(area, &mut buf);

        // 5 entries of 2 lines plus 4 separators.
        assert_eq!(overflow, 14 - 4);
        assert!(buffer_to_string(&buf).contains("reply 4"));

        transcript.scroll_up(100);
        transcript.clamp_scroll(overflow);
        let mut buf = Buffer::empty(area);
        TranscriptView::new(&transcript, &url, 0).render_with_overflow(area, &mut buf);
        let top = buffer_to_string(&buf);
        assert!(top.contains("reply 0"));
        assert!(!top.contains("reply 4"));
    }
}
