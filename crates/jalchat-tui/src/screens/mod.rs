//! Screen definitions for the jalchat TUI.

pub mod chat;

use crate::app::App;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

const HELP_TEXT: &str = r"
  Chat
    Enter             Send the prompt
    Up/Down           Recall history (empty prompt)
    Tab / Shift+Tab   Focus prompt, persona, language
    Left/Right        Change persona or language

  Transcript
    Up/Down, PgUp/PgDn  Scroll
    End / Esc           Jump to latest
    Ctrl+Y              Copy last reply

    F1                Toggle this help
    Ctrl+C            Quit

  [Press any key to close]
";

/// Render the help overlay.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    use crate::ui::centered_fixed;
    use crate::ui::theme::Styles;
    use ratatui::widgets::{Block, Borders, Clear, Paragraph};

    let width = 56.min(area.width.saturating_sub(4));
    let height = 22.min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    Paragraph::new(HELP_TEXT)
        .block(block)
        .style(Styles::default())
        .render(overlay_area, buf);
}
