//! Short-lived signed access tokens.
//!
//! Access tokens are self-contained: the claims travel with the token and
//! are trusted once the HMAC checks out. They are never persisted and never
//! re-checked against the store, which is why the lifetime is short — a
//! revoked session keeps working for at most [`ACCESS_LIFETIME_SECS`].
//!
//! ## Wire Format
//!
//! ```text
//! base64url(claims JSON) "." base64url(HMAC-SHA256 tag)
//! ```
//!
//! The signature is verified in constant time BEFORE the claims are parsed;
//! unauthenticated bytes never reach the JSON parser. Expiry is strict:
//! there is no clock-skew grace window.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crypto;
use crate::error::{AuthError, Result};

/// Access token lifetime in seconds (15 minutes).
pub const ACCESS_LIFETIME_SECS: i64 = 900;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject id of the authenticated user.
    pub sub: String,
    /// Email address at issue time.
    pub email: String,
    /// Display name at issue time.
    pub name: String,
    /// Unique token identifier.
    pub jti: String,
    /// Issuing service, from static configuration.
    pub iss: String,
    /// Intended audience, from static configuration.
    pub aud: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds. The token is invalid the second this passes.
    pub exp: i64,
}

/// Issues and validates signed access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    key: Vec<u8>,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl TokenIssuer {
    /// Create an issuer with the default 15-minute lifetime.
    pub fn new(key: impl Into<Vec<u8>>, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            lifetime: Duration::seconds(ACCESS_LIFETIME_SECS),
        }
    }

    /// Override the token lifetime.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Issue a signed token for the given subject.
    ///
    /// # Errors
    ///
    /// `AuthError::Validation` if the subject id or email is empty.
    pub fn issue(&self, subject_id: &str, email: &str, name: &str) -> Result<String> {
        self.issue_with_lifetime(subject_id, email, name, self.lifetime)
    }

    /// Issue a token with an explicit lifetime.
    ///
    /// A non-positive lifetime produces an already-expired token, which is
    /// occasionally useful for exercising expiry handling downstream.
    pub fn issue_with_lifetime(
        &self,
        subject_id: &str,
        email: &str,
        name: &str,
        lifetime: Duration,
    ) -> Result<String> {
        if subject_id.trim().is_empty() {
            return Err(AuthError::Validation("subject id must not be empty".into()));
        }
        if email.trim().is_empty() {
            return Err(AuthError::Validation("email must not be empty".into()));
        }

        let now = Utc::now();
        let claims = AccessClaims {
            sub: subject_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            jti: crypto::random_jti(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };

        let payload = serde_json::to_vec(&claims)?;
        let tag = crypto::sign(&self.key, &payload);

        debug!(sub = %claims.sub, jti = %claims.jti, "access token issued");
        Ok(format!(
            "{}.{}",
            crypto::b64_encode(&payload),
            crypto::b64_encode(&tag)
        ))
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    ///
    /// - `AuthError::Malformed` when the token cannot be decoded.
    /// - `AuthError::BadSignature` when the tag, issuer, or audience fails.
    /// - `AuthError::Expired` when the expiry has passed (strict).
    pub fn validate(&self, token: &str) -> Result<AccessClaims> {
        let (payload_b64, tag_b64) = token.split_once('.').ok_or(AuthError::Malformed)?;
        let payload = crypto::b64_decode(payload_b64).ok_or(AuthError::Malformed)?;
        let tag = crypto::b64_decode(tag_b64).ok_or(AuthError::Malformed)?;

        // Signature first: unauthenticated bytes never reach the parser.
        if !crypto::verify(&self.key, &payload, &tag) {
            return Err(AuthError::BadSignature);
        }

        let claims: AccessClaims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::Malformed)?;

        if claims.iss != self.issuer || claims.aud != self.audience {
            return Err(AuthError::BadSignature);
        }
        if Utc::now().timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}
