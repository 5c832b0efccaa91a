//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

/// Color palette.
pub struct Theme;

impl Theme {
    pub const BG: Color = Color::Reset;
    pub const FG: Color = Color::Reset;
    pub const FG_DIM: Color = Color::DarkGray;

    // Inverted header colors
    pub const HEADER_FG: Color = Color::Black;
    pub const HEADER_BG: Color = Color::White;

    pub const WARNING: Color = Color::Red;
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Theme::FG).bg(Theme::BG)
    }

    /// Selected mode in the mode bar.
    pub fn mode_active() -> Style {
        Style::default().fg(Theme::HEADER_FG).bg(Theme::HEADER_BG)
    }

    /// Other modes in the mode bar.
    pub fn mode_inactive() -> Style {
        Self::default()
    }

    /// Table header style.
    pub fn table_header() -> Style {
        Style::default().fg(Theme::HEADER_FG).bg(Theme::HEADER_BG)
    }

    /// Sort indicator and refresh time.
    pub fn status() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    /// Skipped-line counter and notices.
    pub fn warning() -> Style {
        Style::default()
            .fg(Theme::WARNING)
            .add_modifier(Modifier::BOLD)
    }
}
