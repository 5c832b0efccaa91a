//! Mode bar: mode names on the left, sort and refresh status on the right.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::config::Mode;
use crate::tui::render::Screen;
use crate::tui::state::ViewState;
use crate::tui::style::Styles;

/// Renders the mode bar.
pub fn render_mode_bar(
    frame: &mut Frame,
    area: Rect,
    modes: &[Mode],
    state: &ViewState,
    screen: &Screen,
) {
    let status = Line::from(status_spans(modes, state, screen));
    let chunks = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(status.width() as u16),
    ])
    .split(area);

    let names: Vec<Span> = modes
        .iter()
        .enumerate()
        .flat_map(|(i, mode)| {
            let style = if i == state.current_mode {
                Styles::mode_active()
            } else {
                Styles::mode_inactive()
            };
            [Span::styled(mode.name.clone(), style), Span::raw(" ")]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(names)), chunks[0]);
    frame.render_widget(
        Paragraph::new(status).alignment(Alignment::Right),
        chunks[1],
    );
}

fn status_spans<'a>(modes: &'a [Mode], state: &ViewState, screen: &Screen) -> Vec<Span<'a>> {
    let mut spans = Vec::new();

    if screen.skipped > 0 {
        spans.push(Span::styled(
            format!("{} skipped ", screen.skipped),
            Styles::warning(),
        ));
    }

    let sort_name = modes
        .get(state.current_mode)
        .and_then(|m| m.fields.get(state.sort_field.wrapping_sub(1)))
        .map(|f| f.name.as_str());
    if let Some(name) = sort_name {
        let arrow = if state.sort_descending { "▼" } else { "▲" };
        spans.push(Span::styled(
            format!("{}:{}{} ", state.sort_field, name, arrow),
            Styles::status(),
        ));
    }

    spans.push(Span::styled(
        screen.refreshed_at.format("%H:%M:%S").to_string(),
        Styles::status(),
    ));
    spans
}
