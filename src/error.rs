//! Error types for seams.

use crate::config::ConfigError;

/// Errors that can occur during chunking.
///
/// Malformed metadata headers, empty bodies and zero-width splits are not
/// errors; the pipeline degrades or recovers from those on its own.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller-supplied token counter failed.
    #[error("token counter failed: {0}")]
    TokenCount(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The chunking configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A chunk's metadata header could not be rendered.
    #[error("failed to render metadata header: {0}")]
    Render(#[from] serde_yaml::Error),
}

impl Error {
    /// Wrap an arbitrary token counter failure.
    pub fn token_count(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::TokenCount(err.into())
    }
}

/// Result type for seams operations.
pub type Result<T> = std::result::Result<T, Error>;
