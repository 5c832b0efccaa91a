//! regtop - run commands periodically and show their output as live,
//! sortable tables in the terminal.
//!
//! - `config`: modes, fields, config file discovery
//! - `executor`: runs a mode's command with a timeout
//! - `parser`: splits command output into rows with the mode's regex
//! - `table`: row type and numeric-aware sorting
//! - `tui`: refresh loop, input handling, rendering

pub mod config;
pub mod executor;
pub mod parser;
pub mod table;
pub mod tui;
