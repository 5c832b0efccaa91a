//! Runs a mode's command and captures its output.
//!
//! Standard output and standard error share one pipe, so the captured text
//! keeps the interleaving the command produced. The wait is bounded by a
//! timeout and can be cut short through a [`CancelToken`].

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::Mode;

/// How often a running child is checked for exit, timeout, or cancellation.
const WAIT_POLL: Duration = Duration::from_millis(10);

const READ_CHUNK: usize = 8192;

/// Error types that can occur while running a command.
#[derive(Debug)]
pub enum ExecError {
    /// The program could not be started.
    Launch {
        program: String,
        source: std::io::Error,
    },
    /// The program exited unsuccessfully.
    Failed {
        program: String,
        status: ExitStatus,
        output: String,
    },
    /// The program ran longer than allowed and was killed.
    Timeout {
        program: String,
        timeout: Duration,
        output: String,
    },
    /// Execution was abandoned because shutdown was requested.
    Cancelled,
}

impl ExecError {
    /// Output captured before the failure, if any.
    pub fn output(&self) -> Option<&str> {
        match self {
            ExecError::Failed { output, .. } | ExecError::Timeout { output, .. } => {
                Some(output.as_str())
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecError::Launch { program, source } => {
                write!(f, "failed to run '{}': {}", program, source)
            }
            ExecError::Failed {
                program, status, ..
            } => write!(f, "'{}' failed with {}", program, status),
            ExecError::Timeout {
                program, timeout, ..
            } => write!(f, "'{}' did not finish within {:?}", program, timeout),
            ExecError::Cancelled => write!(f, "command cancelled"),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Launch { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Shared shutdown flag checked while waiting on a child.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs `mode`'s command with its configured timeout.
pub fn run_mode(mode: &Mode, cancel: &CancelToken) -> Result<String, ExecError> {
    run_command(&mode.command, &mode.args, mode.timeout, cancel)
}

/// Runs `program` to completion and returns its combined stdout/stderr.
///
/// The wait covers the output pipe as well as the child: a command that
/// leaves a background process holding the pipe still ends at the deadline
/// or on cancellation.
pub fn run_command(
    program: &str,
    args: &[String],
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<String, ExecError> {
    let launch = |source: std::io::Error| ExecError::Launch {
        program: program.to_string(),
        source,
    };

    if cancel.is_cancelled() {
        return Err(ExecError::Cancelled);
    }

    let started = Instant::now();
    let (mut reader, writer) = std::io::pipe().map_err(launch)?;
    // The Command holds the write ends; it must be dropped once the child
    // has them so the reader sees EOF when the child exits.
    let mut child = {
        let stderr = writer.try_clone().map_err(launch)?;
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr)
            .spawn()
            .map_err(launch)?
    };

    // Chunks arrive as they are read; a closed channel means EOF.
    let (chunk_tx, chunk_rx) = mpsc::channel::<Vec<u8>>();
    thread::spawn(move || {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if chunk_tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                // A read error just truncates what we show.
                Err(_) => break,
            }
        }
    });

    let deadline = started + timeout;
    let mut output = Vec::new();
    let mut exited: Option<ExitStatus> = None;
    let mut eof = false;
    let status = loop {
        if exited.is_none() {
            match child.try_wait() {
                Ok(status) => exited = status,
                Err(source) => {
                    kill(&mut child);
                    return Err(launch(source));
                }
            }
        }
        if eof {
            thread::sleep(WAIT_POLL);
        } else {
            match chunk_rx.recv_timeout(WAIT_POLL) {
                Ok(chunk) => output.extend_from_slice(&chunk),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => eof = true,
            }
        }
        if let (Some(status), true) = (exited, eof) {
            break status;
        }
        if cancel.is_cancelled() {
            if exited.is_none() {
                kill(&mut child);
            }
            debug!(program, "command cancelled");
            return Err(ExecError::Cancelled);
        }
        if Instant::now() >= deadline {
            if exited.is_none() {
                kill(&mut child);
            }
            debug!(program, exited = exited.is_some(), "command timed out");
            return Err(ExecError::Timeout {
                program: program.to_string(),
                timeout,
                output: lossy(output),
            });
        }
    };

    let output = lossy(output);
    debug!(
        program,
        ?args,
        elapsed_ms = started.elapsed().as_millis() as u64,
        bytes = output.len(),
        "command finished"
    );
    trace!(output = %output, "command output");

    if status.success() {
        Ok(output)
    } else {
        Err(ExecError::Failed {
            program: program.to_string(),
            status,
            output,
        })
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn lossy(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn captures_stdout() {
        let out = run_command(
            "echo",
            &["hello".to_string()],
            Duration::from_secs(5),
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn merges_stderr_into_output() {
        let out = run_command(
            "sh",
            &sh("echo out; echo err 1>&2; echo out2"),
            Duration::from_secs(5),
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(out, "out\nerr\nout2\n");
    }

    #[test]
    fn non_zero_exit_is_an_error_with_output() {
        let err = run_command(
            "sh",
            &sh("echo boom; exit 3"),
            Duration::from_secs(5),
            &CancelToken::new(),
        )
        .unwrap_err();
        match &err {
            ExecError::Failed { status, output, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(output, "boom\n");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(err.output(), Some("boom\n"));
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let err = run_command(
            "/nonexistent/regtop-test-binary",
            &[],
            Duration::from_secs(5),
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ExecError::Launch { .. }));
        assert!(err.output().is_none());
    }

    #[test]
    fn slow_command_times_out() {
        let started = Instant::now();
        let err = run_command(
            "sleep",
            &["5".to_string()],
            Duration::from_millis(100),
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ExecError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn background_process_does_not_outlive_timeout() {
        let started = Instant::now();
        let err = run_command(
            "sh",
            &sh("sleep 5 & echo hi"),
            Duration::from_millis(300),
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(3));
        match err {
            ExecError::Timeout { output, .. } => assert_eq!(output, "hi\n"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn cancel_during_run_stops_wait_on_background_process() {
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            trigger.cancel();
        });

        let started = Instant::now();
        let err = run_command(
            "sh",
            &sh("sleep 5 & echo hi"),
            Duration::from_secs(10),
            &cancel,
        )
        .unwrap_err();
        canceller.join().unwrap();
        assert!(matches!(err, ExecError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn run_mode_uses_command_and_args() {
        use crate::config::{Field, Mode};

        let mut mode = Mode::new("greet", "sh", "(.*)", vec![Field::new("line")])
            .unwrap()
            .with_args(["-c", "echo hi from $0", "regtop"]);
        mode.timeout = Duration::from_secs(5);
        let out = run_mode(&mode, &CancelToken::new()).unwrap();
        assert_eq!(out, "hi from regtop\n");
    }

    #[test]
    fn cancelled_token_stops_wait() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = run_command(
            "sleep",
            &["5".to_string()],
            Duration::from_secs(10),
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(err, ExecError::Cancelled));
    }
}
