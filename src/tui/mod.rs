//! Terminal User Interface for the dashboard.
//!
//! A refresh loop owns the view state and the terminal; a separate input
//! thread turns key presses into [`Action`]s that the loop applies between
//! refreshes.

mod app;
mod event;
pub mod fmt;
mod input;
mod render;
mod state;
mod style;
mod widgets;

pub use app::{App, AppError};
pub use input::{KeyAction, handle_action, map_key};
pub use render::Screen;
pub use state::{Action, ViewState};
