//! Widgets for the dashboard screen.

mod mode_bar;
mod rows;

pub use mode_bar::render_mode_bar;
pub use rows::render_rows;
