//! Error types for Warden Core.

use thiserror::Error;

/// Core error type for warden operations.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Token lifecycle failure passthrough.
    #[error("authentication error: {0}")]
    Auth(#[from] warden_auth::AuthError),

    /// Prompt composition failure passthrough.
    #[error("prompt error: {0}")]
    Prompt(#[from] warden_prompt::PromptError),

    /// Invalid or incomplete configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl WardenError {
    /// HTTP status this failure maps to at the routing layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Auth(err) => err.status_code(),
            Self::Prompt(_) => 400,
            Self::Config(_) => 500,
        }
    }
}

/// Result type for warden operations.
pub type Result<T> = std::result::Result<T, WardenError>;
