//! Input thread.
//!
//! Polls the terminal for key events on its own thread so keys are accepted
//! even while the refresh loop is blocked on a command. Keys are translated
//! to [`Action`]s and sent over a channel that the refresh loop drains.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryIter};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent};
use tracing::{debug, error};

use crate::executor::CancelToken;

use super::input::map_key;
use super::state::Action;

/// Messages from the input thread and signal handler.
#[derive(Debug)]
pub enum Event {
    Action(Action),
    /// The terminal could no longer be read; the dashboard must stop.
    Failed(io::Error),
}

/// Reads events produced by the input thread.
pub struct EventHandler {
    rx: Receiver<Event>,
    tx: Sender<Event>,
}

impl EventHandler {
    /// Spawns the input thread. `poll` bounds how long it blocks between
    /// checks for shutdown.
    ///
    /// A quit key also trips `cancel` so that a command still running in the
    /// refresh loop is abandoned right away.
    pub fn new(poll: Duration, cancel: CancelToken) -> Self {
        let handler = Self::detached();
        let event_tx = handler.sender();

        thread::spawn(move || {
            while !cancel.is_cancelled() {
                let ready = match event::poll(poll) {
                    Ok(ready) => ready,
                    Err(e) => {
                        error!("terminal event poll failed: {}", e);
                        cancel.cancel();
                        let _ = event_tx.send(Event::Failed(e));
                        break;
                    }
                };
                if !ready {
                    continue;
                }
                let Ok(CrosstermEvent::Key(key)) = event::read() else {
                    continue;
                };
                let Some(action) = map_key(key) else {
                    continue;
                };
                debug!(?action, "input");
                if action == Action::Quit {
                    cancel.cancel();
                }
                if event_tx.send(Event::Action(action)).is_err() {
                    break;
                }
            }
        });

        handler
    }

    /// A handler with no input thread; events only come through [`sender`].
    ///
    /// [`sender`]: EventHandler::sender
    pub fn detached() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { rx, tx }
    }

    /// Returns a sender for injecting events from elsewhere (signal handlers).
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Waits up to `timeout` for the next event.
    pub fn next_timeout(&self, timeout: Duration) -> Result<Event, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Events already queued, without blocking.
    pub fn pending(&self) -> TryIter<'_, Event> {
        self.rx.try_iter()
    }
}
