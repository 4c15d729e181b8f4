//! Theme and styling definitions for the jalchat TUI.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for the TUI.
pub struct Palette;

impl Palette {
    // Base colors
    pub const BG: Color = Color::Rgb(24, 30, 36);
    pub const FG: Color = Color::Rgb(220, 226, 230);
    pub const DIM: Color = Color::Rgb(130, 145, 155);

    // Accent colors
    pub const ACCENT: Color = Color::Rgb(90, 190, 210);
    pub const ACCENT_DIM: Color = Color::Rgb(60, 110, 130);

    // Speaker colors
    pub const USER: Color = Color::Rgb(150, 200, 255);
    pub const BOT: Color = Color::Rgb(120, 210, 160);

    // Status bar colors (high contrast)
    pub const STATUS_BG: Color = Color::Rgb(38, 48, 58);
    pub const STATUS_KEY_BG: Color = Color::Rgb(55, 100, 120);

    pub const WARNING: Color = Color::Rgb(240, 200, 100);

    // Border colors
    pub const BORDER: Color = Color::Rgb(70, 85, 95);
    pub const BORDER_ACTIVE: Color = Color::Rgb(90, 190, 210);
}

/// Glyphs used in the transcript.
pub struct Symbols;

impl Symbols {
    pub const GUTTER: &'static str = "│ ";
    pub const IMAGE: &'static str = "[image]";
    pub const DOT_ON: &'static str = "●";
    pub const DOT_OFF: &'static str = "○";
}

/// Common styles used throughout the TUI.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Dimmed text for secondary information.
    pub fn dim() -> Style {
        Style::default().fg(Palette::DIM).bg(Palette::BG)
    }

    /// Highlighted/selected item.
    pub fn highlight() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Warning text, used for notifications.
    pub fn warning() -> Style {
        Style::default().fg(Palette::WARNING).bg(Palette::BG)
    }

    /// Title style.
    pub fn title() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Header line above a user message.
    pub fn user_label() -> Style {
        Style::default()
            .fg(Palette::USER)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Header line above a bot message.
    pub fn bot_label() -> Style {
        Style::default()
            .fg(Palette::BOT)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Gutter drawn beside bot text.
    pub fn bot_gutter() -> Style {
        Style::default().fg(Palette::ACCENT_DIM).bg(Palette::BG)
    }

    /// Image reference inside a bot message.
    pub fn image_link() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .bg(Palette::BG)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Key hint style (for status bar) - bright on dark for visibility.
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint label style - readable on status bar background.
    pub fn key_label() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Status bar background style.
    pub fn status_bar() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Border style for inactive elements.
    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER)
    }

    /// Border style for active/focused elements.
    pub fn border_active() -> Style {
        Style::default().fg(Palette::BORDER_ACTIVE)
    }
}

/// Three-dot typing indicator for the given animation tick.
pub fn pending_dots(tick: usize) -> String {
    let lit = tick % 3;
    (0..3)
        .map(|i| if i == lit { Symbols::DOT_ON } else { Symbols::DOT_OFF })
        .collect::<Vec<_>>()
        .join(" ")
}
