//! Logging configuration and subscriber setup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::NylasConfig;
use crate::errors::{NylasError, NylasResult};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
    /// Abbreviated single lines.
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set.
    pub level: LevelFilter,
    /// Output format.
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
    /// Include the event target.
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Pretty,
            log_file: None,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives logging from client configuration.
    ///
    /// Debug mode lowers the level to `DEBUG`; a log file switches the format
    /// to JSON lines.
    pub fn from_config(config: &NylasConfig) -> Self {
        let mut logging = Self::default();
        if config.debug() {
            logging.level = LevelFilter::DEBUG;
        }
        if let Some(path) = config.log_file() {
            logging.log_file = Some(path.to_path_buf());
            logging.format = LogFormat::Json;
        }
        logging
    }

    /// Sets the log level.
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the log file.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Builds the subscriber without installing it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the log file cannot be opened.
    pub fn build(self) -> NylasResult<Box<dyn Subscriber + Send + Sync>> {
        let writer = match &self.log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| {
                        NylasError::configuration(format!(
                            "Cannot open log file {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                BoxMakeWriter::new(Mutex::new(file))
            }
            None => BoxMakeWriter::new(std::io::stderr),
        };

        let ansi = self.log_file.is_none();
        let layer: Box<dyn Layer<Registry> + Send + Sync> = match self.format {
            LogFormat::Pretty => fmt::layer()
                .with_ansi(ansi)
                .with_target(self.include_target)
                .with_writer(writer)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_target(self.include_target)
                .with_writer(writer)
                .boxed(),
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_ansi(ansi)
                .with_target(self.include_target)
                .with_writer(writer)
                .boxed(),
        };

        let filter = EnvFilter::builder()
            .with_default_directive(self.level.into())
            .from_env_lossy();

        Ok(Box::new(tracing_subscriber::registry().with(layer).with(filter)))
    }

    /// Installs the subscriber globally.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened or a global
    /// subscriber is already installed.
    pub fn init(self) -> NylasResult<()> {
        self.build()?
            .try_init()
            .map_err(|e| NylasError::configuration(format!("Logging already initialized: {}", e)))
    }
}
