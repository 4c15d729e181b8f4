//! Reusable widgets for the jalchat TUI.

pub mod input_bar;
pub mod status_bar;
pub mod transcript;

pub use input_bar::InputBar;
pub use status_bar::{KeyHint, StatusBar};
pub use transcript::TranscriptView;
