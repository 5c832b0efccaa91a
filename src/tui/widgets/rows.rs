//! Fixed-width table of parsed rows.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::config::Mode;
use crate::tui::fmt::{format_cells, format_header};
use crate::tui::render::Screen;
use crate::tui::style::Styles;

/// Renders the header line and as many rows as fit in `area`.
pub fn render_rows(frame: &mut Frame, area: Rect, mode: &Mode, screen: &Screen) {
    let mut lines = Vec::with_capacity(screen.rows.len() + 1);
    lines.push(Line::styled(format_header(&mode.fields), Styles::table_header()));
    lines.extend(
        screen
            .rows
            .iter()
            .take(area.height.saturating_sub(1) as usize)
            .map(|row| {
                Line::styled(format_cells(&mode.fields, row.as_slice()), Styles::default())
            }),
    );
    frame.render_widget(Paragraph::new(lines), area);
}
