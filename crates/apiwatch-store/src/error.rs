use thiserror::Error;

/// Failures at the data fetch boundary
///
/// None of these are fatal: [`crate::CachedSource`] turns every one of them
/// into an empty snapshot with an advisory.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Missing database setting: {0}")]
    Misconfigured(String),

    #[error("Invalid database setting {field}: {reason}")]
    InvalidSetting { field: String, reason: String },

    #[error("Failed to connect to log store: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Failed to query log store: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Failed to read log snapshot: {0}")]
    Snapshot(#[from] apiwatch_core::Error),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;
