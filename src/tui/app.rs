//! Main TUI application: the refresh loop.

use std::io::{self, Stdout};
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_INTERVAL, Mode};
use crate::executor::{CancelToken, ExecError, run_mode};
use crate::parser::parse_output;
use crate::table::sort_rows;

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_action};
use super::render::{Screen, render};
use super::state::{Action, ViewState};

/// Upper bound on how long the input thread blocks between shutdown checks.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Errors that end the dashboard.
#[derive(Debug)]
pub enum AppError {
    /// The terminal could not be set up or drawn to.
    Terminal(io::Error),
    /// A mode's command failed; carries the mode name.
    Command { mode: String, source: ExecError },
}

impl AppError {
    /// Output captured from a failed command, if any.
    pub fn command_output(&self) -> Option<&str> {
        match self {
            AppError::Command { source, .. } => source.output(),
            AppError::Terminal(_) => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Terminal(e) => write!(f, "terminal error: {}", e),
            AppError::Command { mode, source } => write!(f, "mode '{}': {}", mode, source),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Terminal(e) => Some(e),
            AppError::Command { source, .. } => Some(source),
        }
    }
}

impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        AppError::Terminal(e)
    }
}

/// Owns the terminal while the dashboard runs and restores it on drop, so
/// every exit path (quit, command failure, unwinding) leaves a usable shell.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let setup = || -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
            terminal.hide_cursor()?;
            terminal.clear()?;
            Ok(terminal)
        };
        match setup() {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                Err(e)
            }
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Main TUI application.
pub struct App {
    config: Config,
    state: ViewState,
    cancel: CancelToken,
}

impl App {
    /// Creates a new App for the given config.
    pub fn new(config: Config) -> Self {
        let state = ViewState::new(&config.modes);
        Self {
            config,
            state,
            cancel: CancelToken::new(),
        }
    }

    /// Runs the dashboard until quit or a command fails.
    ///
    /// The terminal is restored before this returns, on success and on error.
    pub fn run(mut self) -> Result<(), AppError> {
        let mut guard = TerminalGuard::new()?;
        let events = EventHandler::new(INPUT_POLL, self.cancel.clone());
        self.install_signal_handler(&events);
        info!(modes = self.config.modes.len(), "dashboard started");

        let result = self.run_loop(&mut guard.terminal, &events);

        // Stops the input thread before the guard hands the terminal back.
        self.cancel.cancel();
        info!("dashboard stopped");
        result
    }

    fn run_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &EventHandler,
    ) -> Result<(), AppError> {
        loop {
            if self.tick(terminal, events)? == KeyAction::Quit {
                return Ok(());
            }
            let deadline = Instant::now() + self.interval();
            if self.wait_until(deadline, events)? == KeyAction::Quit {
                return Ok(());
            }
        }
    }

    /// Refreshes and redraws the current mode. Does nothing while paused.
    fn tick<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &EventHandler,
    ) -> Result<KeyAction, AppError> {
        if self.state.paused {
            return Ok(KeyAction::None);
        }
        let screen = match self.refresh() {
            Ok(screen) => screen,
            Err(ExecError::Cancelled) => {
                // Cancellation means shutdown; surface an input failure if that caused it.
                take_failure(events)?;
                return Ok(KeyAction::Quit);
            }
            Err(source) => {
                let mode = self
                    .current_mode()
                    .map(|m| m.name.clone())
                    .unwrap_or_default();
                return Err(AppError::Command { mode, source });
            }
        };
        let modes = &self.config.modes;
        let state = &self.state;
        terminal.draw(|frame| render(frame, modes, state, &screen))?;
        Ok(KeyAction::None)
    }

    /// Runs one execute → parse → sort pass for the current mode.
    fn refresh(&self) -> Result<Screen, ExecError> {
        let Some(mode) = self.current_mode() else {
            return Ok(Screen::empty());
        };
        let output = run_mode(mode, &self.cancel)?;
        let mut parsed = parse_output(mode, &output);
        sort_rows(
            &mut parsed.rows,
            self.state.sort_field,
            self.state.sort_descending,
        );
        debug!(
            mode = %mode.name,
            rows = parsed.rows.len(),
            skipped = parsed.skipped,
            sort_field = self.state.sort_field,
            descending = self.state.sort_descending,
            "refreshed"
        );
        Ok(Screen {
            rows: parsed.rows,
            skipped: parsed.skipped,
            refreshed_at: Local::now(),
        })
    }

    /// Applies incoming actions until `deadline`. Returns early on quit.
    fn wait_until(
        &mut self,
        deadline: Instant,
        events: &EventHandler,
    ) -> Result<KeyAction, AppError> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(KeyAction::None);
            }
            match events.next_timeout(remaining) {
                Ok(Event::Action(action)) => {
                    if handle_action(&mut self.state, action) == KeyAction::Quit {
                        return Ok(KeyAction::Quit);
                    }
                }
                Ok(Event::Failed(e)) => return Err(AppError::Terminal(e)),
                Err(RecvTimeoutError::Timeout) => return Ok(KeyAction::None),
                Err(RecvTimeoutError::Disconnected) => return Ok(KeyAction::Quit),
            }
        }
    }

    fn current_mode(&self) -> Option<&Mode> {
        self.config.modes.get(self.state.current_mode)
    }

    /// Read fresh every tick so a mode switch picks up the new interval.
    fn interval(&self) -> Duration {
        self.current_mode()
            .map(|m| m.interval)
            .unwrap_or(DEFAULT_INTERVAL)
    }

    /// Raw mode turns Ctrl-C into a key event, but SIGTERM/SIGHUP (and SIGINT
    /// sent with kill) still need to tear the terminal down.
    fn install_signal_handler(&self, events: &EventHandler) {
        let tx = events.sender();
        let cancel = self.cancel.clone();
        let result = ctrlc::set_handler(move || {
            cancel.cancel();
            let _ = tx.send(Event::Action(Action::Quit));
        });
        if let Err(e) = result {
            warn!("cannot install signal handler: {}", e);
        }
    }
}

/// Returns the input failure queued on `events`, if any.
fn take_failure(events: &EventHandler) -> Result<(), AppError> {
    for event in events.pending() {
        if let Event::Failed(e) = event {
            return Err(AppError::Terminal(e));
        }
    }
    Ok(())
}
