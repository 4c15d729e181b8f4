//! Prompt input bar.
//!
//! While the surface is locked the bar is greyed out and shows a waiting
//! line instead of the prompt.

use crate::text::visual_width;
use crate::ui::theme::Styles;
use jalchat_engine::InputSurface;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

const PROMPT: &str = "> ";
const CURSOR: &str = "█";
const WAITING: &str = "● Waiting for response...";
const PLACEHOLDER: &str = "Ask about groundwater, rainfall, crops...";

/// Input bar bound to an [`InputSurface`].
pub struct InputBar<'a> {
    input: &'a InputSurface,
}

impl<'a> InputBar<'a> {
    /// Create a new input bar widget.
    pub fn new(input: &'a InputSurface) -> Self {
        Self { input }
    }

    /// Build the prompt line, keeping the cursor inside `width` cells.
    fn prompt_line(&self, width: usize) -> Line<'static> {
        let chars: Vec<char> = self.input.content().chars().collect();

        if chars.is_empty() && !self.input.is_focused() {
            return Line::from(vec![
                Span::raw(PROMPT),
                Span::styled(PLACEHOLDER, Styles::dim()),
            ]);
        }

        let cursor = self.input.cursor().min(chars.len());
        let available = width.saturating_sub(visual_width(PROMPT) + 1);

        // Drop leading characters until the cursor fits.
        let mut start = 0;
        let mut before_width: usize = chars[..cursor].iter().filter_map(|c| c.width()).sum();
        while before_width > available && start < cursor {
            before_width -= chars[start].width().unwrap_or(0);
            start += 1;
        }

        let before: String = chars[start..cursor].iter().collect();
        let after: String = chars[cursor..].iter().collect();
        let mut spans = vec![Span::raw(PROMPT), Span::raw(before)];
        if self.input.is_focused() {
            spans.push(Span::styled(CURSOR, Styles::highlight()));
        }
        spans.push(Span::raw(after));
        Line::from(spans)
    }
}

impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let focused = self.input.is_focused() && self.input.is_enabled();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if focused {
                Styles::border_active()
            } else {
                Styles::border()
            })
            .style(Styles::default());

        let paragraph = if self.input.is_enabled() {
            let width = usize::from(area.width.saturating_sub(2));
            Paragraph::new(self.prompt_line(width)).style(Styles::default())
        } else {
            Paragraph::new(WAITING).style(Styles::dim())
        };

        paragraph.block(block).render(area, buf);
    }
}
