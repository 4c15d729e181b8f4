//! Chat screen: selectors, transcript, prompt, and status bar.

use crate::app::{App, Focus};
use crate::screens::Screen;
use crate::text::{truncate_to_width, visual_width};
use crate::ui::theme::Styles;
use crate::ui::widgets::{InputBar, KeyHint, StatusBar, TranscriptView};
use crate::ui::{chat_layout, Palette};
use jalchat_engine::Selection;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// The chat screen.
pub struct ChatScreen;

impl Screen for ChatScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let layout = chat_layout(area);

        render_header(app, layout.header, buf);
        render_transcript(app, layout.transcript, buf);
        InputBar::new(app.controller.input()).render(layout.input, buf);
        render_status(app, layout.status, buf);
    }
}

fn selector_spans(selection: &Selection, focused: bool) -> Vec<Span<'static>> {
    let value_style = if focused {
        Styles::highlight().bg(Palette::STATUS_KEY_BG)
    } else {
        Styles::default()
    };
    vec![
        Span::styled(format!("{}: ", selection.label()), Styles::dim()),
        Span::styled(format!("‹ {} ›", selection.value()), value_style),
    ]
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .title(" jalchat ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border())
        .style(Styles::default());
    let inner = block.inner(area);
    block.render(area, buf);

    let mut spans = vec![Span::raw(" ")];
    spans.extend(selector_spans(
        app.controller.persona(),
        app.focus == Focus::Persona,
    ));
    spans.push(Span::raw("   "));
    spans.extend(selector_spans(
        app.controller.language(),
        app.focus == Focus::Language,
    ));
    let line = Line::from(spans);
    let used = line.width();
    Paragraph::new(line).render(inner, buf);

    // Endpoint on the right when there is room for it.
    let room = usize::from(inner.width).saturating_sub(used + 2);
    if room > 10 {
        let endpoint = truncate_to_width(app.controller.backend().endpoint().as_str(), room);
        let width = u16::try_from(visual_width(&endpoint)).unwrap_or(inner.width);
        let x = inner.x + inner.width.saturating_sub(width + 1);
        buf.set_string(x, inner.y, endpoint, Styles::dim());
    }
}

fn render_transcript(app: &App, area: Rect, buf: &mut Buffer) {
    let transcript = app.controller.transcript();
    let title = if transcript.is_following() {
        " Conversation ".to_string()
    } else {
        format!(" Conversation (↑{}) ", transcript.scroll_back())
    };
    let block = Block::default()
        .title(title)
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border())
        .style(Styles::default());
    let inner = block.inner(area);
    block.render(area, buf);

    if transcript.is_empty() {
        Paragraph::new(Line::from(Span::styled(
            "Ask a question to get started.",
            Styles::dim(),
        )))
        .render(inner, buf);
        app.set_transcript_overflow(0);
        return;
    }

    let overflow = TranscriptView::new(transcript, app.controller.backend().endpoint(), app.tick)
        .render_with_overflow(inner, buf);
    app.set_transcript_overflow(overflow);
}

fn render_status(app: &App, area: Rect, buf: &mut Buffer) {
    let hints = vec![
        KeyHint::new("Enter", "Send"),
        KeyHint::new("^Y", "Copy"),
        KeyHint::new("F1", "Help"),
        KeyHint::new("^C", "Quit"),
    ];
    let (mode, busy) = if app.is_waiting() {
        ("WAITING", true)
    } else {
        ("READY", false)
    };

    let count = app.controller.transcript().message_count();
    let count_text = format!("{count} messages");
    let (right, style): (&str, Style) = match &app.notification {
        Some(notification) => (notification, Styles::warning()),
        None => (&count_text, Styles::status_bar()),
    };

    StatusBar::new(mode)
        .busy(busy)
        .hints(hints)
        .right(right, style)
        .render(area, buf);
}
