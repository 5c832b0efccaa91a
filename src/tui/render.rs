//! Main rendering logic for TUI.

use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::config::Mode;
use crate::table::Row;

use super::state::ViewState;
use super::style::Styles;
use super::widgets::{render_mode_bar, render_rows};

/// Result of one refresh cycle, ready to draw.
#[derive(Debug, Clone)]
pub struct Screen {
    /// Sorted rows of the current mode.
    pub rows: Vec<Row>,
    /// Lines that did not parse.
    pub skipped: usize,
    pub refreshed_at: DateTime<Local>,
}

impl Screen {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            skipped: 0,
            refreshed_at: Local::now(),
        }
    }
}

/// Main render function.
pub fn render(frame: &mut Frame, modes: &[Mode], state: &ViewState, screen: &Screen) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Mode bar
        Constraint::Min(0),    // Header + rows
    ])
    .split(frame.area());

    render_mode_bar(frame, chunks[0], modes, state, screen);

    match modes.get(state.current_mode) {
        Some(mode) => render_rows(frame, chunks[1], mode, screen),
        None => {
            let notice = Line::styled("No modes configured. Press q to quit.", Styles::warning());
            frame.render_widget(Paragraph::new(notice), chunks[1]);
        }
    }
}
