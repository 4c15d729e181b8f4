//! Application state and update logic for the jalchat TUI.

use crate::event::Action;
use jalchat_engine::{
    ChatBackend, ChatError, ChatResponse, Config, ConfigError, HttpBackend, RequestController,
    SubmitOutcome,
};
use std::cell::Cell;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Lines scrolled per PageUp/PageDown.
const PAGE_LINES: usize = 10;

/// Ticks a notification stays visible (~3 seconds at 4 Hz).
const NOTIFICATION_TICKS: usize = 12;

/// Handle of the request currently in flight.
pub type RequestHandle = JoinHandle<Result<ChatResponse, ChatError>>;

/// Which control has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The prompt field.
    #[default]
    Input,
    /// The persona selector.
    Persona,
    /// The language selector.
    Language,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Input => Self::Persona,
            Self::Persona => Self::Language,
            Self::Language => Self::Input,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Input => Self::Language,
            Self::Persona => Self::Input,
            Self::Language => Self::Persona,
        }
    }
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Tick counter for animations.
    pub tick: usize,

    /// Control holding keyboard focus.
    pub focus: Focus,

    /// Notification message (displayed temporarily, cleared after some ticks).
    pub notification: Option<String>,

    /// Ticks remaining until notification is cleared.
    notification_ttl: usize,

    /// Submit lifecycle, transcript, and input state.
    pub controller: RequestController<HttpBackend>,

    /// Request in flight, if any.
    request: Option<RequestHandle>,

    /// Transcript lines that did not fit at the last render.
    transcript_overflow: Cell<usize>,
}

impl App {
    /// Create a new app instance from configuration.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let backend = HttpBackend::from_config(config)?;
        Ok(Self::with_backend(backend, config))
    }

    fn with_backend(backend: HttpBackend, config: &Config) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            tick: 0,
            focus: Focus::Input,
            notification: None,
            notification_ttl: 0,
            controller: RequestController::from_config(backend, config),
            request: None,
            transcript_overflow: Cell::new(0),
        }
    }

    /// Create an app for tests, pointed at an endpoint nothing listens on.
    #[cfg(test)]
    pub fn new_for_test() -> Self {
        let config = Config {
            endpoint: "http://127.0.0.1:9/chat".into(),
            ..Config::default()
        };
        Self::new(&config).expect("test config is valid")
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        if self.show_help && action != Action::Quit {
            self.show_help = false;
            return;
        }

        match action {
            Action::Quit => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
            }
            Action::Help => self.show_help = true,
            Action::Submit => {
                if self.focus == Focus::Input {
                    self.submit();
                }
            }
            Action::NextFocus => self.set_focus(self.focus.next()),
            Action::PrevFocus => self.set_focus(self.focus.prev()),
            Action::Left => match self.focus {
                Focus::Persona => self.controller.persona_mut().prev(),
                Focus::Language => self.controller.language_mut().prev(),
                Focus::Input => self.controller.input_mut().move_left(),
            },
            Action::Right => match self.focus {
                Focus::Persona => self.controller.persona_mut().next(),
                Focus::Language => self.controller.language_mut().next(),
                Focus::Input => self.controller.input_mut().move_right(),
            },
            Action::ScrollUp => self.scroll_up(1),
            Action::ScrollDown => self.controller.transcript_mut().scroll_down(1),
            Action::PageUp => self.scroll_up(PAGE_LINES),
            Action::PageDown => self.controller.transcript_mut().scroll_down(PAGE_LINES),
            Action::JumpToLatest => self.controller.transcript_mut().scroll_to_end(),
            Action::CopyReply => self.copy_last_reply(),
            Action::None => {}
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.controller
            .input_mut()
            .set_focused(focus == Focus::Input);
    }

    fn scroll_up(&mut self, lines: usize) {
        let overflow = self.transcript_overflow.get();
        let transcript = self.controller.transcript_mut();
        transcript.scroll_up(lines);
        transcript.clamp_scroll(overflow);
    }

    /// Record how many transcript lines did not fit at the last render.
    pub fn set_transcript_overflow(&self, lines: usize) {
        self.transcript_overflow.set(lines);
    }

    /// Submit the prompt field, spawning the request on the runtime.
    ///
    /// Empty prompts and submits while a request is in flight do nothing.
    pub fn submit(&mut self) {
        match self.controller.begin_submit() {
            Ok(request) => {
                let backend = self.controller.backend().clone();
                self.request = Some(tokio::spawn(async move { backend.send(&request).await }));
            }
            Err(skip) => debug!(?skip, "submit skipped"),
        }
    }

    /// Whether a request is in flight.
    pub fn is_waiting(&self) -> bool {
        self.controller.is_in_flight()
    }

    /// Settle the in-flight request if it has finished.
    ///
    /// A request task that panicked or was cancelled settles as a
    /// transport failure, so the input surface is always unlocked.
    pub async fn poll_request(&mut self) -> Option<SubmitOutcome> {
        if !self.request.as_ref().is_some_and(JoinHandle::is_finished) {
            return None;
        }
        let handle = self.request.take()?;
        Some(self.settle(handle).await)
    }

    /// Wait for the in-flight request and settle it.
    pub async fn wait_for_request(&mut self) -> Option<SubmitOutcome> {
        let handle = self.request.take()?;
        Some(self.settle(handle).await)
    }

    /// Settle a finished request and hand focus back to the prompt field,
    /// even if a selector was focused while it was in flight.
    async fn settle(&mut self, handle: RequestHandle) -> SubmitOutcome {
        let result = handle
            .await
            .unwrap_or_else(|e| Err(ChatError::Transport(format!("request task failed: {e}"))));
        let outcome = self.controller.settle(result);
        self.set_focus(Focus::Input);
        outcome
    }

    /// Abort the in-flight request, if any.
    pub fn abort_request(&mut self) {
        if let Some(handle) = self.request.take() {
            handle.abort();
        }
    }

    /// Copy the most recent bot reply to the system clipboard.
    pub fn copy_last_reply(&mut self) {
        let Some(text) = self
            .controller
            .transcript()
            .last_bot_message()
            .map(|m| m.text.clone())
        else {
            self.set_notification("Nothing to copy yet".into());
            return;
        };

        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => self.set_notification("Reply copied".into()),
            Err(e) => {
                warn!(error = %e, "clipboard unavailable");
                self.set_notification("Clipboard unavailable".into());
            }
        }
    }

    fn set_notification(&mut self, msg: String) {
        self.notification = Some(msg);
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Increment tick counter and update time-based state.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jalchat_engine::{Sender, SurfaceState, ERROR_PREFIX};

    #[test]
    fn test_new_app_defaults() {
        let app = App::new_for_test();
        assert_eq!(app.focus, Focus::Input);
        assert!(!app.should_quit);
        assert!(!app.is_waiting());
        assert!(app.controller.transcript().is_empty());
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let config = Config {
            endpoint: "::not a url::".into(),
            ..Config::default()
        };
        assert!(App::new(&config).is_err());
    }

    #[test]
    fn test_focus_cycles() {
        let mut app = App::new_for_test();
        app.handle_action(Action::NextFocus);
        assert_eq!(app.focus, Focus::Persona);
        assert!(!app.controller.input().is_focused());

        app.handle_action(Action::NextFocus);
        assert_eq!(app.focus, Focus::Language);

        app.handle_action(Action::NextFocus);
        assert_eq!(app.focus, Focus::Input);
        assert!(app.controller.input().is_focused());

        app.handle_action(Action::PrevFocus);
        assert_eq!(app.focus, Focus::Language);
    }

    #[test]
    fn test_left_right_change_focused_selection() {
        let mut app = App::new_for_test();
        let initial = app.controller.persona().value().to_string();

        app.handle_action(Action::NextFocus);
        app.handle_action(Action::Right);
        assert_ne!(app.controller.persona().value(), initial);

        app.handle_action(Action::Left);
        assert_eq!(app.controller.persona().value(), initial);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Help);
        assert!(app.show_help);

        // Any key closes help
        app.handle_action(Action::ScrollUp);
        assert!(!app.show_help);
    }

    #[test]
    fn test_quit() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_scroll_is_clamped_to_overflow() {
        let mut app = App::new_for_test();
        app.set_transcript_overflow(3);
        app.handle_action(Action::PageUp);
        assert_eq!(app.controller.transcript().scroll_back(), 3);

        app.handle_action(Action::JumpToLatest);
        assert!(app.controller.transcript().is_following());
    }

    #[test]
    fn test_notification_expires() {
        let mut app = App::new_for_test();
        app.handle_action(Action::CopyReply);
        assert_eq!(app.notification.as_deref(), Some("Nothing to copy yet"));

        for _ in 0..NOTIFICATION_TICKS {
            app.tick();
        }
        assert!(app.notification.is_none());
    }

    #[tokio::test]
    async fn test_empty_submit_does_not_spawn() {
        let mut app = App::new_for_test();
        app.controller.input_mut().insert_str("   ");
        app.handle_action(Action::Submit);

        assert!(!app.is_waiting());
        assert!(app.wait_for_request().await.is_none());
        assert!(app.controller.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_failed_request_settles_and_unlocks() {
        let mut app = App::new_for_test();
        app.controller.input_mut().insert_str("hello");
        app.handle_action(Action::Submit);

        assert!(app.is_waiting());
        assert_eq!(app.controller.input().state(), SurfaceState::Locked);
        assert!(app.controller.transcript().has_pending());

        let outcome = app.wait_for_request().await;
        assert!(matches!(outcome, Some(SubmitOutcome::Failed(_))));

        let last = app.controller.transcript().messages().last().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert!(last.text.starts_with(ERROR_PREFIX));
        assert!(!app.controller.transcript().has_pending());
        assert!(app.controller.input().is_enabled());
        assert!(app.controller.input().is_focused());
    }

    #[tokio::test]
    async fn test_focus_returns_to_prompt_after_settle() {
        let mut app = App::new_for_test();
        app.controller.input_mut().insert_str("hello");
        app.handle_action(Action::Submit);
        app.handle_action(Action::NextFocus);
        assert_eq!(app.focus, Focus::Persona);
        assert!(!app.controller.input().is_focused());

        app.wait_for_request().await;
        assert_eq!(app.focus, Focus::Input);
        assert!(app.controller.input().is_focused());
    }
}
