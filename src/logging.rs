use std::fs::OpenOptions;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file `{path}`: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid log filter `{0}`")]
    Filter(String),
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Install the tracing subscriber.
///
/// The terminal belongs to the UI, so logs only go to a file. Without a
/// configured file nothing is installed and events are dropped.
pub fn init(config: &Config) -> Result<bool, LoggingError> {
    let Some(path) = config.log_file.as_deref() else {
        return Ok(false);
    };

    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|_| LoggingError::Filter(config.log_level.clone()))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenFile {
            path: path.to_string(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))?;

    Ok(true)
}
