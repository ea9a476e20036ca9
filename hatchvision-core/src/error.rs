use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("Sink timed out after {0} ms")]
    SinkTimeout(u64),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
