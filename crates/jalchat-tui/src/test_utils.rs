//! Test utilities for jalchat-tui rendering tests.
//!
//! Helpers for creating test terminals and apps, and for turning rendered
//! buffers into strings for assertions.

use crate::app::App;
use crate::screens::Screen as ScreenTrait;
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test terminal with custom dimensions.
pub fn create_test_terminal_sized(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Create a test app pointed at a closed local port.
pub fn create_test_app() -> App {
    App::new_for_test()
}

/// Convert a buffer to a string, one row per line with trailing spaces
/// trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}

/// Render a screen to a buffer and return it as a string.
pub fn render_screen_to_string<S: ScreenTrait>(screen: &S, app: &App) -> String {
    render_screen_to_string_sized(screen, app, TEST_WIDTH, TEST_HEIGHT)
}

/// Render a screen at custom dimensions and return it as a string.
pub fn render_screen_to_string_sized<S: ScreenTrait>(
    screen: &S,
    app: &App,
    width: u16,
    height: u16,
) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::chat::ChatScreen;

    #[test]
    fn test_terminal_draw_matches_direct_render() {
        let app = create_test_app();
        let mut terminal = create_test_terminal_sized(TEST_WIDTH, TEST_HEIGHT);
        terminal
            .draw(|frame| {
                let area = frame.area();
                ChatScreen.render(&app, area, frame.buffer_mut());
            })
            .unwrap();

        let drawn = buffer_to_string(terminal.backend().buffer());
        assert_eq!(drawn, render_screen_to_string(&ChatScreen, &app));
    }

    #[test]
    fn test_narrow_screen_does_not_panic() {
        let app = create_test_app();
        let out = render_screen_to_string_sized(&ChatScreen, &app, 20, 8);
        assert!(!out.is_empty());
    }

    #[test]
    fn test_buffer_to_string() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", ratatui::style::Style::default());
        buffer.set_string(0, 1, "World", ratatui::style::Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\nWorld\n");
    }
}
