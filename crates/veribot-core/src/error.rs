//! Workspace-wide error type.

use thiserror::Error;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, VeribotError>;

#[derive(Debug, Error)]
pub enum VeribotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("knowledge store error: {0}")]
    Store(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("provider '{0}' is not known")]
    ProviderNotFound(String),

    #[error("no API key configured for provider '{0}'")]
    ApiKeyMissing(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("document source error: {0}")]
    Source(String),
}
