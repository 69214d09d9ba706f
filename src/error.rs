//! Error types for the Telegram scraper

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing Telegram API credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Session is locked by another process")]
    SessionLocked,

    #[error("Failed to acquire session lock: {0}")]
    LockError(String),

    #[error("Telegram API error: {0}")]
    TelegramError(String),

    #[error("Channel not found: {0}")]
    ChatNotFound(String),

    #[error("Not a channel: {0}")]
    NotAChannel(String),

    #[error("Media download failed: {0}")]
    DownloadError(String),

    #[error("CSV error: {0}")]
    CsvError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Errors that must abort the whole run before any channel is processed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::MissingCredentials(_)
                | Error::InvalidArgument(_)
                | Error::ConfigError(_)
                | Error::Authorization(_)
                | Error::SessionLocked
                | Error::LockError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<grammers_client::InvocationError> for Error {
    fn from(err: grammers_client::InvocationError) -> Self {
        Error::TelegramError(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::CsvError(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
