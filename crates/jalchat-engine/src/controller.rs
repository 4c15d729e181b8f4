//! Request lifecycle controller.
//!
//! Owns the submit lifecycle from a user action to a settled transcript:
//!
//! ```text
//! Idle ──submit (non-empty)──▶ Locked ──settle (success or failure)──▶ Idle
//!   ▲                                                                   │
//!   └──────────── empty submit never leaves Idle ◀──────────────────────┘
//! ```
//!
//! [`RequestController::begin_submit`] validates and locks, renders the
//! user message and the pending indicator, and hands back the request to
//! send. [`RequestController::settle`] takes the outcome, clears the
//! indicator, renders the reply or the error, and unlocks. An event loop
//! that needs to keep drawing while the request is in flight calls the two
//! halves itself; [`RequestController::submit`] runs both around the
//! backend call.

use crate::client::{ChatBackend, ChatError, ChatRequest, ChatResponse};
use crate::config::Config;
use crate::input::{InputSurface, Selection};
use crate::message::Sender;
use crate::transcript::Transcript;
use tracing::{error, info};

/// Prefix of the bot message rendered for any failed round trip.
pub const ERROR_PREFIX: &str = "Sorry, an error occurred: ";

/// Why a submit did not start a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitSkip {
    /// The trimmed prompt was empty.
    EmptyPrompt,
    /// A request is already in flight.
    InFlight,
}

/// How a submit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing happened.
    Skipped(SubmitSkip),
    /// The bot reply was rendered.
    Answered,
    /// The round trip failed and an error message was rendered.
    Failed(ChatError),
}

/// Drives one request at a time from submit to settle.
#[derive(Debug)]
pub struct RequestController<B> {
    backend: B,
    transcript: Transcript,
    input: InputSurface,
    persona: Selection,
    language: Selection,
    in_flight: bool,
}

impl<B: ChatBackend> RequestController<B> {
    /// Create a controller with the given selections.
    pub fn new(backend: B, persona: Selection, language: Selection) -> Self {
        Self {
            backend,
            transcript: Transcript::new(),
            input: InputSurface::new(),
            persona,
            language,
            in_flight: false,
        }
    }

    /// Create a controller with the selections described by `config`.
    pub fn from_config(backend: B, config: &Config) -> Self {
        let persona =
            Selection::with_value("Persona", config.personas.clone(), &config.default_persona);
        let language = Selection::with_value(
            "Language",
            config.languages.clone(),
            &config.default_language,
        );
        Self::new(backend, persona, language)
    }

    /// The backend requests are sent through.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The rendered transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Mutable transcript access for view-side scrolling.
    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// The prompt field.
    pub fn input(&self) -> &InputSurface {
        &self.input
    }

    /// Mutable prompt field access for editing.
    pub fn input_mut(&mut self) -> &mut InputSurface {
        &mut self.input
    }

    /// The persona selector.
    pub fn persona(&self) -> &Selection {
        &self.persona
    }

    /// Mutable persona selector.
    pub fn persona_mut(&mut self) -> &mut Selection {
        &mut self.persona
    }

    /// The language selector.
    pub fn language(&self) -> &Selection {
        &self.language
    }

    /// Mutable language selector.
    pub fn language_mut(&mut self) -> &mut Selection {
        &mut self.language
    }

    /// Whether a request is in flight.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start a submit.
    ///
    /// On success the field has been cleared and locked, the user message
    /// and the pending indicator are in the transcript, and the returned
    /// request must be sent and its outcome passed to [`Self::settle`].
    /// An empty prompt or a request already in flight changes nothing.
    pub fn begin_submit(&mut self) -> Result<ChatRequest, SubmitSkip> {
        if self.in_flight || !self.input.is_enabled() {
            return Err(SubmitSkip::InFlight);
        }

        let prompt = self.input.take_prompt();
        if prompt.is_empty() {
            return Err(SubmitSkip::EmptyPrompt);
        }

        self.input.lock();
        self.in_flight = true;

        self.transcript.render(Sender::User, prompt.clone(), None);
        self.transcript.show_pending();

        let request = ChatRequest {
            prompt,
            persona: self.persona.value().to_string(),
            language: self.language.value().to_string(),
        };
        info!(persona = %request.persona, language = %request.language, "submitting prompt");
        Ok(request)
    }

    /// Finish a submit with the outcome of its request.
    ///
    /// The pending indicator is removed before anything else is rendered,
    /// and the surface is unlocked and focused on every path.
    pub fn settle(&mut self, result: Result<ChatResponse, ChatError>) -> SubmitOutcome {
        self.transcript.remove_pending();

        let outcome = match result {
            Ok(response) => {
                self.transcript
                    .render(Sender::Bot, response.text, response.image_url);
                SubmitOutcome::Answered
            }
            Err(err) => {
                self.transcript.remove_pending();
                error!(error = %err, status = ?err.status(), "chat request failed");
                self.transcript
                    .render(Sender::Bot, format!("{ERROR_PREFIX}{err}"), None);
                SubmitOutcome::Failed(err)
            }
        };

        self.in_flight = false;
        self.input.unlock();
        outcome
    }

    /// Run a whole submit: validate, send, and settle.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(skip) => return SubmitOutcome::Skipped(skip),
        };
        let result = self.backend.send(&request).await;
        self.settle(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::transcript::Entry;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Backend that replays canned outcomes and records every request.
    #[derive(Debug, Clone, Default)]
    struct ScriptedBackend {
        replies: Arc<Mutex<VecDeque<Result<ChatResponse, ChatError>>>>,
        requests: Arc<Mutex<Vec<ChatRequest>>>,
    }

    impl ScriptedBackend {
        fn replying(reply: Result<ChatResponse, ChatError>) -> Self {
            let backend = Self::default();
            backend.replies.lock().unwrap().push_back(reply);
            backend
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl ChatBackend for ScriptedBackend {
        async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ChatError::Transport("no scripted reply".into())))
        }
    }

    fn controller(backend: ScriptedBackend) -> RequestController<ScriptedBackend> {
        RequestController::from_config(backend, &Config::default())
    }

    fn ok(text: &str, image_url: Option<&str>) -> Result<ChatResponse, ChatError> {
        Ok(ChatResponse {
            text: text.into(),
            image_url: image_url.map(String::from),
        })
    }

    fn last_message<B: ChatBackend>(ctl: &RequestController<B>) -> &Message {
        ctl.transcript().messages().last().unwrap()
    }

    fn assert_settled<B: ChatBackend>(ctl: &RequestController<B>) {
        assert!(ctl.input().is_enabled());
        assert!(ctl.input().is_focused());
        assert!(!ctl.is_in_flight());
        assert_eq!(ctl.transcript().pending_count(), 0);
    }

    #[test]
    fn test_begin_submit_renders_user_message_before_sending() {
        let backend = ScriptedBackend::default();
        let mut ctl = controller(backend.clone());
        ctl.input_mut().insert_str("  How is Pune doing?  ");

        let request = ctl.begin_submit().unwrap();

        assert_eq!(request.prompt, "How is Pune doing?");
        assert!(backend.requests().is_empty());
        assert_eq!(ctl.transcript().message_count(), 1);
        let msg = last_message(&ctl);
        assert_eq!(msg.sender, Sender::User);
        assert_eq!(msg.text, "How is Pune doing?");
        assert!(matches!(ctl.transcript().entries()[1], Entry::Pending(_)));
        assert!(ctl.input().is_empty());
        assert!(!ctl.input().is_enabled());
        assert!(ctl.is_in_flight());
    }

    #[tokio::test]
    async fn test_empty_prompt_is_skipped() {
        for prompt in ["", "   ", "\n\t "] {
            let backend = ScriptedBackend::default();
            let mut ctl = controller(backend.clone());
            ctl.input_mut().insert_str(prompt);

            let outcome = ctl.submit().await;

            assert_eq!(outcome, SubmitOutcome::Skipped(SubmitSkip::EmptyPrompt));
            assert!(ctl.transcript().is_empty());
            assert!(backend.requests().is_empty());
            assert!(ctl.input().is_enabled());
            assert_eq!(ctl.input().content(), prompt);
        }
    }

    #[test]
    fn test_submit_while_in_flight_is_rejected() {
        let mut ctl = controller(ScriptedBackend::default());
        ctl.input_mut().insert_str("first");
        ctl.begin_submit().unwrap();

        assert_eq!(ctl.begin_submit(), Err(SubmitSkip::InFlight));
        assert_eq!(ctl.transcript().message_count(), 1);
        assert_eq!(ctl.transcript().pending_count(), 1);
    }

    #[tokio::test]
    async fn test_success_with_image() {
        let backend = ScriptedBackend::replying(ok("Hi", Some("x.png")));
        let mut ctl = controller(backend.clone());
        ctl.input_mut().insert_str("hello");

        assert_eq!(ctl.submit().await, SubmitOutcome::Answered);

        let msg = last_message(&ctl);
        assert_eq!(msg.sender, Sender::Bot);
        assert_eq!(msg.text, "Hi");
        assert_eq!(msg.image_url.as_deref(), Some("x.png"));
        assert_eq!(backend.requests().len(), 1);
        assert_settled(&ctl);
    }

    #[tokio::test]
    async fn test_success_without_image() {
        let mut ctl = controller(ScriptedBackend::replying(ok("Hi", None)));
        ctl.input_mut().insert_str("hello");
        ctl.submit().await;

        let msg = last_message(&ctl);
        assert_eq!(msg.text, "Hi");
        assert!(msg.image_url.is_none());
        assert!(!msg.html_fragment().contains("<img"));
    }

    #[tokio::test]
    async fn test_server_error_with_text() {
        let err = ChatError::Server {
            status: 500,
            message: "boom".into(),
        };
        let mut ctl = controller(ScriptedBackend::replying(Err(err.clone())));
        ctl.input_mut().insert_str("hello");

        assert_eq!(ctl.submit().await, SubmitOutcome::Failed(err));
        let msg = last_message(&ctl);
        assert_eq!(msg.sender, Sender::Bot);
        assert_eq!(msg.text, "Sorry, an error occurred: boom");
        assert_settled(&ctl);
    }

    #[tokio::test]
    async fn test_server_error_unparseable_body() {
        let err = crate::client::interpret_response(500, b"<html>oops</html>").unwrap_err();
        let mut ctl = controller(ScriptedBackend::replying(Err(err)));
        ctl.input_mut().insert_str("hello");
        ctl.submit().await;

        let msg = last_message(&ctl);
        assert!(msg.text.starts_with(ERROR_PREFIX));
        assert!(msg.text.contains("500"));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let err = ChatError::Transport("connection refused".into());
        let mut ctl = controller(ScriptedBackend::replying(Err(err)));
        ctl.input_mut().insert_str("hello");
        ctl.submit().await;

        let msg = last_message(&ctl);
        assert!(msg.text.contains("connection refused"));
        assert!(!ctl.transcript().has_pending());
        assert_settled(&ctl);
    }

    #[test]
    fn test_settle_removes_pending_before_reply() {
        let mut ctl = controller(ScriptedBackend::default());
        ctl.input_mut().insert_str("hello");
        ctl.begin_submit().unwrap();
        ctl.settle(ok("reply", None));

        let entries = ctl.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| matches!(e, Entry::Message(_))));
    }

    #[tokio::test]
    async fn test_selections_read_at_send_time() {
        let backend = ScriptedBackend::replying(ok("ok", None));
        let mut ctl = controller(backend.clone());
        ctl.persona_mut().select("Farmer");
        ctl.language_mut().select("Hindi");
        ctl.input_mut().insert_str("hello");

        ctl.submit().await;

        let requests = backend.requests();
        assert_eq!(requests[0].persona, "Farmer");
        assert_eq!(requests[0].language, "Hindi");
    }

    #[tokio::test]
    async fn test_markup_in_prompt_is_literal() {
        let mut ctl = controller(ScriptedBackend::replying(ok("ok", None)));
        ctl.input_mut().insert_str("<b>bold?</b>");
        ctl.submit().await;

        let user = ctl.transcript().messages().next().unwrap();
        assert_eq!(user.display_text(), "<b>bold?</b>");
        assert!(user.html_fragment().contains("&lt;b&gt;bold?&lt;/b&gt;"));
    }

    #[tokio::test]
    async fn test_consecutive_submits() {
        let backend = ScriptedBackend::default();
        {
            let mut replies = backend.replies.lock().unwrap();
            replies.push_back(ok("one", None));
            replies.push_back(Err(ChatError::Transport("down".into())));
            replies.push_back(ok("three", None));
        }
        let mut ctl = controller(backend.clone());

        for prompt in ["a", "b", "c"] {
            ctl.input_mut().insert_str(prompt);
            ctl.submit().await;
            assert_settled(&ctl);
        }

        let texts: Vec<&str> = ctl.transcript().messages().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["a", "one", "b", "Sorry, an error occurred: down", "c", "three"]
        );
        assert_eq!(backend.requests().len(), 3);
    }
}
