//! Configuration types for the Warden facade.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use warden_context::ValidatorConfig;

/// Configuration for [`crate::Warden`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WardenConfig {
    /// Token lifecycle configuration.
    pub auth: AuthConfig,

    /// CSRF token configuration.
    pub csrf: CsrfConfig,

    /// Prompt defense configuration.
    pub prompt: PromptConfig,

    /// Hallucination-scoring thresholds.
    pub validator: ValidatorConfig,
}

/// Token lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing key for access tokens. Must be non-empty; there is no
    /// usable default on purpose.
    pub signing_key: String,

    /// `iss` claim stamped into access tokens.
    pub issuer: String,

    /// `aud` claim stamped into access tokens.
    pub audience: String,

    /// Access token lifetime in seconds.
    pub access_ttl_secs: i64,

    /// Refresh session lifetime in seconds.
    pub refresh_ttl_secs: i64,

    /// Path to the session database.
    pub db_path: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_key: String::new(),
            issuer: "chat-warden".to_string(),
            audience: "chat-api".to_string(),
            access_ttl_secs: warden_auth::ACCESS_LIFETIME_SECS,
            refresh_ttl_secs: warden_auth::REFRESH_LIFETIME_SECS,
            db_path: PathBuf::from("./warden_sessions.db"),
        }
    }
}

/// CSRF token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfConfig {
    /// Token lifetime in seconds.
    pub ttl_secs: u64,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

/// Prompt defense configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Hard cap on user input, in characters.
    pub max_input_chars: usize,

    /// Whether an injection match yields a Block verdict. When false the
    /// match is still reported for logging.
    pub block_on_injection: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 2000,
            block_on_injection: true,
        }
    }
}
