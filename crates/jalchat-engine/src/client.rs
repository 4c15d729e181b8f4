//! Backend client for the chat endpoint.
//!
//! The wire contract is a single `POST` with a JSON body
//! `{prompt, persona, language}`. A 2xx answer carries
//! `{text, imageUrl?}`; anything else may carry `{text}` describing the
//! failure. [`interpret_response`] turns a status and body into a
//! [`ChatResponse`] or a [`ChatError`] without touching the network, and
//! [`HttpBackend`] wires it to reqwest.

use crate::config::{Config, ConfigError};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Outbound chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Trimmed user prompt.
    pub prompt: String,
    /// Persona selected at send time.
    pub persona: String,
    /// Language selected at send time.
    pub language: String,
}

/// Successful chat response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Reply text.
    pub text: String,
    /// Optional generated image. `null` and absent are the same.
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Ways a chat round trip can fail.
///
/// The `Display` form is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// No response was received (connection refused, reset, timed out).
    #[error("{0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A 2xx body that is not the expected JSON.
    #[error("{0}")]
    MalformedResponse(String),
}

impl ChatError {
    /// HTTP status, when the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Transport(_) | Self::MalformedResponse(_) => None,
        }
    }
}

/// Something that can carry a chat request to a backend.
pub trait ChatBackend {
    /// Send one request and wait for its outcome.
    fn send(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, ChatError>> + Send;
}

/// Interpret a backend answer.
///
/// Non-2xx statuses become [`ChatError::Server`], using the body's `text`
/// field when it is a non-empty string and `HTTP error! status: <code>`
/// otherwise. A 2xx body must parse as [`ChatResponse`].
pub fn interpret_response(status: u16, body: &[u8]) -> Result<ChatResponse, ChatError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("text")
                    .and_then(Value::as_str)
                    .filter(|text| !text.is_empty())
                    .map(String::from)
            })
            .unwrap_or_else(|| format!("HTTP error! status: {status}"));
        return Err(ChatError::Server { status, message });
    }

    serde_json::from_slice::<ChatResponse>(body)
        .map_err(|e| ChatError::MalformedResponse(format!("Invalid JSON in response: {e}")))
}

/// Resolve an image reference against the endpoint it came from.
///
/// Backends usually answer with a server-relative path such as
/// `/static/generated_charts/<id>.png`. Absolute URLs pass through, and
/// anything that cannot be joined is returned unchanged.
pub fn resolve_image_url(base: &Url, image_url: &str) -> String {
    base.join(image_url)
        .map_or_else(|_| image_url.to_string(), String::from)
}

/// reqwest-backed [`ChatBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpBackend {
    /// Create a backend posting to `endpoint`.
    ///
    /// Without a timeout a request waits until the server answers or the
    /// connection fails.
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ConfigError::Client)?;
        Ok(Self { client, endpoint })
    }

    /// Create a backend from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(config.endpoint_url()?, config.timeout())
    }

    /// The endpoint requests are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Resolve an image reference from a response of this backend.
    pub fn resolve_image_url(&self, image_url: &str) -> String {
        resolve_image_url(&self.endpoint, image_url)
    }
}

impl ChatBackend for HttpBackend {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        debug!(endpoint = %self.endpoint, persona = %request.persona, language = %request.language, "posting chat request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        debug!(status, bytes = body.len(), "chat response received");
        interpret_response(status, &body)
    }
}
