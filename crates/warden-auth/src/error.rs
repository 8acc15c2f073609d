//! Error types for token lifecycle operations.
//!
//! The taxonomy maps directly onto HTTP semantics at the routing layer:
//! validation failures are 4xx, lifecycle failures are 401, store failures
//! are 5xx and are never bypassed. Messages are deliberately generic so a
//! caller cannot distinguish an unknown token from a tampered one.

use thiserror::Error;

/// Error type for all token lifecycle operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed caller input (empty subject id, empty email, ...).
    #[error("invalid request: {0}")]
    Validation(String),

    /// Token is past its expiry. Strict comparison, no clock-skew grace.
    #[error("token expired")]
    Expired,

    /// Token belongs to a revoked session.
    #[error("token revoked")]
    Revoked,

    /// Token is unknown, already rotated away, or lost a rotation race.
    #[error("invalid token")]
    Invalid,

    /// Signature or issuer/audience check failed.
    #[error("invalid token signature")]
    BadSignature,

    /// Token could not be decoded at all.
    #[error("malformed token")]
    Malformed,

    /// Claims or session rows could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing store unavailable. Fatal to the request; never silently
    /// authenticate on a storage failure.
    #[error("token store unavailable: {0}")]
    Store(String),
}

impl AuthError {
    /// The HTTP status code this failure maps to at the routing layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Malformed => 400,
            Self::Expired | Self::Revoked | Self::Invalid | Self::BadSignature => 401,
            Self::Serialization(_) | Self::Store(_) => 500,
        }
    }
}

impl From<sled::Error> for AuthError {
    fn from(err: sled::Error) -> Self {
        AuthError::Store(err.to_string())
    }
}

/// Result type for token lifecycle operations.
pub type Result<T> = std::result::Result<T, AuthError>;
