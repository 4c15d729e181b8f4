//! jalchat-tui: Terminal UI for the jalchat chat client
//!
//! This crate provides the presentation layer over `jalchat-engine`:
//! - Chat screen with persona and language selectors
//! - Transcript pane with the animated pending indicator
//! - Prompt input bar that locks while a request is in flight

mod app;
mod event;
mod screens;
#[cfg(test)]
pub mod test_utils;
mod text;
mod ui;

use screens::Screen as ScreenTrait;

pub use app::{App, Focus};
pub use event::{Action, Event, EventHandler};
pub use jalchat_engine;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use jalchat_engine::{Config, SubmitOutcome};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use tracing::{info, warn};

/// Tick rate of the event loop (4 Hz).
const TICK_RATE_MS: u64 = 250;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// on exit. Must be called from within a tokio runtime.
pub async fn run_tui(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Build the app first so a bad endpoint fails before the screen switches.
    let mut app = App::new(config)?;

    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut events = EventHandler::new(TICK_RATE_MS);
    info!(endpoint = %config.endpoint, "chat session started");

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    terminal.show_cursor()?;
    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            let buf = frame.buffer_mut();

            screens::chat::ChatScreen.render(app, area, buf);

            if app.show_help {
                screens::render_help_overlay(area, buf);
            }
        })?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    if !app.show_help && handle_input_key(app, key) {
                        continue;
                    }
                    app.handle_action(event::key_to_action(key));
                }
                Event::Mouse(mouse) => {
                    use crossterm::event::MouseEventKind;
                    match mouse.kind {
                        MouseEventKind::ScrollUp => app.handle_action(Action::ScrollUp),
                        MouseEventKind::ScrollDown => app.handle_action(Action::ScrollDown),
                        _ => {}
                    }
                }
                Event::Tick => app.tick(),
                Event::Resize(_, _) => {
                    // Terminal will handle resize automatically
                }
            }
        }

        if let Some(outcome) = app.poll_request().await {
            if let SubmitOutcome::Failed(err) = &outcome {
                warn!(error = %err, "request settled with an error");
            }
        }

        if app.should_quit {
            app.abort_request();
            break;
        }
    }

    Ok(())
}

/// Route a key to the prompt field when it has focus.
/// Returns true if the key was consumed as text editing.
fn handle_input_key(app: &mut App, key: KeyEvent) -> bool {
    if app.focus != Focus::Input || key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }

    let input = app.controller.input_mut();
    match key.code {
        KeyCode::Char(c) => {
            input.insert(c);
            true
        }
        KeyCode::Backspace => {
            input.backspace();
            true
        }
        KeyCode::Delete => {
            input.delete();
            true
        }
        KeyCode::Home => {
            input.move_home();
            true
        }
        // End jumps to the latest message unless there is text to move through.
        KeyCode::End if !input.is_empty() => {
            input.move_end();
            true
        }
        KeyCode::Up if input.is_empty() && input.is_enabled() => {
            input.history_prev();
            true
        }
        KeyCode::Down if input.is_empty() && input.is_enabled() => {
            input.history_next();
            true
        }
        _ => false,
    }
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_app;
    use jalchat_engine::SurfaceState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(handle_input_key(app, key(KeyCode::Char(c))));
        }
    }

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    #[test]
    fn test_typing_edits_prompt() {
        let mut app = create_test_app();
        type_str(&mut app, "hi<b>");
        assert!(handle_input_key(&mut app, key(KeyCode::Backspace)));
        assert_eq!(app.controller.input().content(), "hi<b");
    }

    #[test]
    fn test_keys_pass_through_when_selector_focused() {
        let mut app = create_test_app();
        app.handle_action(Action::NextFocus);
        assert!(!handle_input_key(&mut app, key(KeyCode::Char('x'))));
        assert!(app.controller.input().is_empty());
    }

    #[test]
    fn test_control_keys_are_actions() {
        let mut app = create_test_app();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!handle_input_key(&mut app, ctrl_c));
    }

    #[test]
    fn test_end_on_empty_prompt_jumps_to_latest() {
        let mut app = create_test_app();
        assert!(!handle_input_key(&mut app, key(KeyCode::End)));

        type_str(&mut app, "abc");
        assert!(handle_input_key(&mut app, key(KeyCode::End)));
    }

    #[test]
    fn test_up_on_empty_prompt_without_history_is_consumed() {
        let mut app = create_test_app();
        assert!(handle_input_key(&mut app, key(KeyCode::Up)));
        assert!(app.controller.input().is_empty());

        type_str(&mut app, "draft");
        assert!(!handle_input_key(&mut app, key(KeyCode::Up)));
    }

    #[tokio::test]
    async fn test_submit_then_recall_from_history() {
        let mut app = create_test_app();
        type_str(&mut app, "Compare Pune vs Nashik");
        app.handle_action(Action::Submit);
        assert_eq!(app.controller.input().state(), SurfaceState::Locked);

        // Edits are ignored while locked.
        type_str(&mut app, "zzz");
        assert!(app.controller.input().is_empty());

        app.wait_for_request().await;
        assert!(app.controller.input().is_enabled());

        assert!(handle_input_key(&mut app, key(KeyCode::Up)));
        assert_eq!(app.controller.input().content(), "Compare Pune vs Nashik");
    }

    #[tokio::test]
    async fn test_typing_reaches_prompt_after_tabbing_away_mid_request() {
        let mut app = create_test_app();
        type_str(&mut app, "Pune");
        app.handle_action(Action::Submit);
        app.handle_action(Action::NextFocus);
        assert!(!handle_input_key(&mut app, key(KeyCode::Char('x'))));

        app.wait_for_request().await;
        type_str(&mut app, "Nashik");
        assert_eq!(app.controller.input().content(), "Nashik");
    }
}
