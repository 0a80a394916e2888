//! Console and file `tracing` output for applications without a subscriber
//! of their own.
//!
//! ```no_run
//! use addlogging::setup::{self, LogConfig};
//!
//! setup::init(&LogConfig::from_env()).expect("logging already configured");
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// Filter directive variable, e.g. `info` or `addlogging=debug,warn`.
pub const LEVEL_VAR: &str = "ADDLOGGING_LEVEL";
/// Log file variable; an empty value disables the file.
pub const FILE_VAR: &str = "ADDLOGGING_FILE";
pub const DEFAULT_FILTER: &str = "info";
pub const DEFAULT_FILE: &str = "file.log";

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid log filter `{directive}`")]
    Filter {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error("cannot open log file {}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] TryInitError),
}

/// Where log output goes and how much of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive.
    pub filter: String,
    /// Write `LEVEL target: message` lines to stderr.
    pub console: bool,
    /// Append timestamped lines to this file.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_owned(),
            console: true,
            file: Some(PathBuf::from(DEFAULT_FILE)),
        }
    }
}

impl LogConfig {
    /// Defaults overridden by [`LEVEL_VAR`] and [`FILE_VAR`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(filter) = lookup(LEVEL_VAR).filter(|value| !value.trim().is_empty()) {
            config.filter = filter.trim().to_owned();
        }
        if let Some(file) = lookup(FILE_VAR) {
            config.file = (!file.is_empty()).then(|| PathBuf::from(file));
        }
        config
    }

    pub fn console_only() -> Self {
        Self {
            file: None,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn without_console(mut self) -> Self {
        self.console = false;
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, SetupError> {
        EnvFilter::try_new(&self.filter).map_err(|source| SetupError::Filter {
            directive: self.filter.clone(),
            source,
        })
    }
}

/// Installs the global subscriber described by `config`.
pub fn init(config: &LogConfig) -> Result<(), SetupError> {
    subscriber(config)?.try_init()?;

    tracing::debug!(filter = %config.filter, file = ?config.file, "logging initialised");
    Ok(())
}

/// Builds the subscriber [`init`] installs, without installing it.
pub fn subscriber(
    config: &LogConfig,
) -> Result<impl Subscriber + Send + Sync + 'static, SetupError> {
    let filter = config.env_filter()?;

    let console = config.console.then(|| {
        fmt::layer()
            .without_time()
            .with_target(true)
            .with_writer(io::stderr)
    });

    let file = match &config.file {
        Some(path) => {
            let handle = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| SetupError::File {
                    path: path.clone(),
                    source,
                })?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(handle)))
        }
        None => None,
    };

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file))
}
