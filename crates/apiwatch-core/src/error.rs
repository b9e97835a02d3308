use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read log records: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse log records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record on line {line}: {source}")]
    InvalidLine {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    #[error("Invalid classification rule: {0}")]
    InvalidRule(String),
}

pub type Result<T> = std::result::Result<T, Error>;
