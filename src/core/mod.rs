//! Core utilities: error types and logging.

pub mod error;
pub mod logging;

pub use error::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
