use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

use crate::settings::{LogFormat, LoggingSettings};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("opening log file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("logging error: {0}")]
    Init(String),
}

/// Install the global subscriber. `RUST_LOG` wins over `settings.level`.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&settings.level)?,
    };

    build_subscriber(settings, filter)?
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))
}

/// Parse a filter directive such as `warn` or `modelcheck_validate=debug`.
pub fn level_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(level).map_err(|err| LoggingError::Filter(err.to_string()))
}

fn build_subscriber(
    settings: &LoggingSettings,
    filter: EnvFilter,
) -> Result<impl Subscriber + Send + Sync + 'static, LoggingError> {
    let writer = match &settings.file {
        Some(path) => LogFile::open(path)?.into_make_writer(),
        None => BoxMakeWriter::new(io::stderr),
    };

    let (json, text) = match settings.format {
        LogFormat::Json => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(writer),
            ),
            None,
        ),
        LogFormat::Text => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(settings.file.is_none())
                    .with_writer(writer),
            ),
        ),
    };

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text))
}

/// Append-only log file shared by every writer the subscriber makes.
#[derive(Clone)]
struct LogFile(Arc<Mutex<File>>);

impl LogFile {
    fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self(Arc::new(Mutex::new(file))))
    }

    fn into_make_writer(self) -> BoxMakeWriter {
        BoxMakeWriter::new(move || self.clone())
    }

    fn locked<T>(&self, op: impl FnOnce(&mut File) -> io::Result<T>) -> io::Result<T> {
        let mut file = self
            .0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        op(&mut file)
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.locked(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.locked(|file| file.flush())
    }
}
