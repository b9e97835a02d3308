pub mod analysis;
pub mod classify;
pub mod error;
pub mod filter;
pub mod io;
pub mod payload;
pub mod record;
pub mod report;

pub use error::{Error, Result};
