//! regtop - terminal dashboard for periodically run commands.
//!
//! Usage:
//!   regtop                       # config from ~/.regtop.yml or /etc/regtop.yml
//!   regtop -c ./modes.yml        # explicit config file
//!   regtop --log-file /tmp/r.log -v
//!
//! Keys: space pause, 1-9 sort, ] / [ next/previous mode, q quit.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{Level, error};
use tracing_subscriber::EnvFilter;

use regtop::config::{Config, ConfigError, default_paths, program_name};
use regtop::tui::App;

/// Terminal dashboard for periodically run commands.
#[derive(Debug, Parser)]
#[command(name = "regtop", about = "Live tables from command output", version)]
struct Args {
    /// Config file to use instead of ~/.<prog>.yml and /etc/<prog>.yml.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to this file. Without it logs are discarded, since the
    /// dashboard owns the terminal.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Default is info; each `-v` goes one level further.
fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Exit status for a rejected command line. Help and version requests are
/// not failures; everything else maps to the usual fatal status.
fn usage_exit_code(e: &clap::Error) -> i32 {
    if e.use_stderr() { 1 } else { 0 }
}

/// Initializes the tracing subscriber writing to `log_file`, if any.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> std::io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let level = log_level(verbose);
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load(path),
        None => Config::discover(&default_paths(&program_name())?),
    }
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(usage_exit_code(&e));
        }
    };

    if let Err(e) = init_logging(args.verbose, args.log_file.as_deref()) {
        eprintln!("Error opening log file: {}", e);
        std::process::exit(1);
    }

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // The terminal is already restored when run() returns.
    if let Err(e) = App::new(config).run() {
        error!("{}", e);
        if let Some(output) = e.command_output().filter(|o| !o.is_empty()) {
            eprint!("{}", output);
            if !output.ends_with('\n') {
                eprintln!();
            }
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(argv)
    }

    #[test]
    fn bare_invocation_uses_discovery() {
        let args = parse(&["regtop"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.log_file.is_none());
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn stray_argument_exits_with_status_one() {
        let err = parse(&["regtop", "foo"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 1);
        let err = parse(&["regtop", "--bogus"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn help_and_version_exit_with_status_zero() {
        let err = parse(&["regtop", "--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 0);
        let err = parse(&["regtop", "--version"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 0);
    }

    #[test]
    fn verbosity_defaults_to_info() {
        assert_eq!(log_level(parse(&["regtop"]).unwrap().verbose), Level::INFO);
        assert_eq!(log_level(parse(&["regtop", "-v"]).unwrap().verbose), Level::DEBUG);
        assert_eq!(log_level(parse(&["regtop", "-vvv"]).unwrap().verbose), Level::TRACE);
    }
}
