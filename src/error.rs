//! Error types for the WhatsApp mailer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Country Code Missing in Phone Number: {0}")]
    CountryCodeMissing(String),

    #[error("File with numbers should end with '.txt': {0}")]
    BadFileExtension(String),

    #[error("Image file should end with '.jpeg', '.jpg' or '.png': {0}")]
    BadImageExtension(String),

    #[error("Another mailing is already running")]
    SendLocked,

    #[error("Failed to acquire mailing lock: {0}")]
    LockError(String),

    #[error("Automation driver error: {0}")]
    Automation(String),

    #[error("Browser error: {0}")]
    BrowserError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
