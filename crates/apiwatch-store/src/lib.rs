pub mod cache;
pub mod config;
pub mod error;
pub mod mysql;
pub mod source;

pub use cache::{CachedSource, Snapshot, UNAVAILABLE_ADVISORY};
pub use config::{DbConfig, DbSettings};
pub use error::{FetchError, Result};
pub use mysql::MySqlSource;
pub use source::{FileSource, RecordSource};
