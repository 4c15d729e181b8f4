//! jalchat-engine: Headless core of the jalchat chat client
//!
//! This crate provides everything except the presentation layer:
//! - Transcript rendering and the pending-response indicator
//! - The request controller that owns the submit lifecycle
//! - Input surface and selection state
//! - The HTTP backend client
//! - Configuration

pub mod client;
pub mod config;
pub mod controller;
pub mod input;
pub mod message;
pub mod transcript;

// Re-export commonly used types
pub use client::{
    interpret_response, resolve_image_url, ChatBackend, ChatError, ChatRequest, ChatResponse,
    HttpBackend,
};
pub use config::{Config, ConfigError, CONFIG_DIR, CONFIG_FILE};
pub use controller::{RequestController, SubmitOutcome, SubmitSkip, ERROR_PREFIX};
pub use input::{InputSurface, Selection, SurfaceState};
pub use message::{escape_markup, Message, Sender, BOT_LABEL, USER_LABEL};
pub use transcript::{Entry, PendingMarker, Transcript};

pub use reqwest::Url;

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
