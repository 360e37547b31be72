//! Error types for the Planhaus engine

use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("document error: {0}")]
    Document(#[from] serde_json::Error),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("skeleton error: {0}")]
    Skeleton(String),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("scene error: {0}")]
    Scene(String),
}
