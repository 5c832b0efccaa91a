//! Dashboard configuration.
//!
//! A config file is a YAML document with a list of modes. Each mode names a
//! command to run, a regular expression that splits every output line into
//! fields, and how those fields are laid out on screen:
//!
//! ```yaml
//! modes:
//!   - name: procs
//!     cmd: ps
//!     args: ["-eo", "pid,pcpu,comm"]
//!     matchre: '(\d+)\s+([\d.]+)\s+(.*)'
//!     interval: 2
//!     dropheader: 1
//!     sortfield: 2
//!     fields:
//!       - { name: PID, width: 8 }
//!       - { name: CPU }
//!       - { name: COMMAND, width: 30 }
//! ```
//!
//! The file is looked up as `$HOME/.<prog>.yml` and then `/etc/<prog>.yml`,
//! where `<prog>` is the base name the binary was invoked as.

use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

/// Column width used when a field does not set one.
pub const DEFAULT_FIELD_WIDTH: usize = 10;
/// Refresh interval used when a mode does not set one.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
/// Upper bound on a single command execution when a mode does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error types that can occur while locating or loading the config.
#[derive(Debug)]
pub enum ConfigError {
    /// None of the candidate paths exist.
    NotFound(Vec<PathBuf>),
    /// The current user's home directory could not be determined.
    NoHomeDir,
    /// The config file exists but could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The config file is not valid YAML for the expected schema.
    Parse {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
    /// A mode is syntactically valid but cannot be used.
    Invalid { mode: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(paths) => {
                let list: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                write!(f, "No configuration file found in [{}]", list.join(", "))
            }
            ConfigError::NoHomeDir => write!(f, "Cannot determine home directory of current user"),
            ConfigError::Read { path, source } => {
                write!(f, "Error reading config file {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Error parsing config file {}: {}", path.display(), source)
            }
            ConfigError::Invalid { mode, message } => {
                write!(f, "Invalid mode '{}': {}", mode, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// One output column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Field {
    /// Column header.
    pub name: String,
    /// Hidden fields are parsed (and sortable) but never drawn.
    #[serde(default, rename = "hide")]
    pub hidden: bool,
    /// Column width in characters.
    #[serde(default)]
    pub width: Option<usize>,
}

impl Field {
    /// Creates a visible field with the default width.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hidden: false,
            width: None,
        }
    }

    /// Returns the configured width, or [`DEFAULT_FIELD_WIDTH`].
    pub fn width(&self) -> usize {
        self.width.unwrap_or(DEFAULT_FIELD_WIDTH)
    }
}

/// A named command + parsing + display configuration.
///
/// Immutable once loaded. The sort field the user last picked for a mode is
/// runtime state and lives in the TUI view state, seeded from
/// [`Mode::default_sort_field`].
#[derive(Debug, Clone)]
pub struct Mode {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    /// Compiled `matchre`; capture groups 1..N map to `fields`.
    pub pattern: Regex,
    pub interval: Duration,
    pub timeout: Duration,
    pub fields: Vec<Field>,
    pub drop_header: usize,
    pub drop_footer: usize,
    /// 1-based.
    pub default_sort_field: usize,
}

impl Mode {
    /// Builds a mode with defaults for everything but the essentials.
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        pattern: &str,
        fields: Vec<Field>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let pattern = compile_pattern(&name, pattern)?;
        Ok(Self {
            name,
            command: command.into(),
            args: Vec::new(),
            pattern,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            fields,
            drop_header: 0,
            drop_footer: 0,
            default_sort_field: 1,
        })
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Number of capture groups in the pattern, not counting the whole match.
    pub fn group_count(&self) -> usize {
        self.pattern.captures_len().saturating_sub(1)
    }

    fn from_raw(raw: RawMode) -> Result<Self, ConfigError> {
        let name = if raw.name.is_empty() {
            raw.cmd.clone()
        } else {
            raw.name
        };
        let invalid = |message: String| ConfigError::Invalid {
            mode: name.clone(),
            message,
        };

        if raw.cmd.is_empty() {
            return Err(invalid("cmd must not be empty".to_string()));
        }
        if raw.fields.is_empty() {
            return Err(invalid("at least one field is required".to_string()));
        }

        let interval = match raw.interval {
            Some(secs) => seconds(secs).ok_or_else(|| {
                invalid(format!("interval must be a positive number of seconds, got {}", secs))
            })?,
            None => DEFAULT_INTERVAL,
        };
        let timeout = match raw.timeout {
            Some(secs) => seconds(secs).ok_or_else(|| {
                invalid(format!("timeout must be a positive number of seconds, got {}", secs))
            })?,
            None => DEFAULT_TIMEOUT,
        };

        let default_sort_field = if raw.sortfield == 0 { 1 } else { raw.sortfield };
        if default_sort_field > raw.fields.len() {
            return Err(invalid(format!(
                "sortfield {} is out of range (mode has {} fields)",
                default_sort_field,
                raw.fields.len()
            )));
        }

        let pattern = compile_pattern(&name, &raw.matchre)?;
        let groups = pattern.captures_len().saturating_sub(1);
        if groups != raw.fields.len() {
            warn!(
                mode = %name,
                groups,
                fields = raw.fields.len(),
                "matchre capture groups do not match field count; every line will be skipped"
            );
        }

        Ok(Self {
            name,
            command: raw.cmd,
            args: raw.args,
            pattern,
            interval,
            timeout,
            fields: raw.fields,
            drop_header: raw.dropheader,
            drop_footer: raw.dropfooter,
            default_sort_field,
        })
    }
}

fn compile_pattern(mode: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::Invalid {
        mode: mode.to_string(),
        message: format!("bad matchre: {}", e),
    })
}

fn seconds(secs: f64) -> Option<Duration> {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

/// On-disk representation of a mode.
#[derive(Debug, Deserialize)]
struct RawMode {
    cmd: String,
    #[serde(default)]
    args: Vec<String>,
    matchre: String,
    #[serde(default)]
    interval: Option<f64>,
    #[serde(default)]
    timeout: Option<f64>,
    #[serde(default)]
    fields: Vec<Field>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    dropheader: usize,
    #[serde(default)]
    dropfooter: usize,
    #[serde(default)]
    sortfield: usize,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    modes: Vec<RawMode>,
}

/// Loaded, validated configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub modes: Vec<Mode>,
}

impl Config {
    /// Parses a YAML document. `path` is only used for error messages.
    pub fn from_yaml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_yaml_ng::from_str(contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let modes = raw
            .modes
            .into_iter()
            .map(Mode::from_raw)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { modes })
    }

    /// Reads and parses the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&contents, path)?;
        debug!(path = %path.display(), modes = config.modes.len(), "config loaded");
        Ok(config)
    }

    /// Loads the first existing file among `paths`.
    pub fn discover(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let found = paths
            .iter()
            .find(|p| p.exists())
            .ok_or_else(|| ConfigError::NotFound(paths.to_vec()))?;
        Self::load(found)
    }
}

/// Returns the config search order for `program`, user file first.
pub fn candidate_paths(program: &str, home: &Path) -> Vec<PathBuf> {
    vec![
        home.join(format!(".{}.yml", program)),
        PathBuf::from(format!("/etc/{}.yml", program)),
    ]
}

/// Returns the config search order for `program` using the current user's home.
pub fn default_paths(program: &str) -> Result<Vec<PathBuf>, ConfigError> {
    let dirs = directories::BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
    Ok(candidate_paths(program, dirs.home_dir()))
}

/// Base name of the running binary, used to derive config file names.
pub fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}
