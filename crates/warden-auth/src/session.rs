//! Refresh-session lifecycle: issue, rotate, revoke.
//!
//! A refresh session is one logical row per login. Rotation replaces the
//! secret and expiry in that row rather than appending a new one, so a
//! captured secret stops working the moment the legitimate client (or the
//! thief — whichever arrives first) exchanges it. The loser of that race
//! gets [`AuthError::Invalid`] and the session can be revoked.
//!
//! State machine:
//!
//! ```text
//! Active ── rotate ──▶ Active (new secret)
//!   │
//!   ├── revoke ──▶ Terminal
//!   └── expiry ──▶ Terminal
//! ```
//!
//! There is no reactivation. A revoked or expired row never mints another
//! access token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::access::TokenIssuer;
use crate::crypto;
use crate::error::{AuthError, Result};
use crate::store::SessionStore;

/// Refresh session lifetime in seconds (7 days).
pub const REFRESH_LIFETIME_SECS: i64 = 7 * 24 * 3600;

/// Client metadata captured at login for audit purposes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientMeta {
    /// Client IP address as reported by the transport layer.
    pub ip: String,
    /// User-agent string.
    pub user_agent: String,
}

/// A persisted refresh session row.
///
/// The raw secret never appears here — only its SHA-256 digest. Subject
/// email and display name are snapshotted at login so rotation can mint a
/// complete access token without consulting the user store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session id (UUIDv4).
    pub id: String,
    /// Subject id of the session owner.
    pub subject_id: String,
    /// Email snapshot at login.
    pub email: String,
    /// Display-name snapshot at login.
    pub display_name: String,
    /// Grant identifier, regenerated on every rotation.
    pub jti: String,
    /// Hex SHA-256 digest of the current secret.
    pub secret_digest: String,
    /// Expiry of the current secret.
    pub expires_at: DateTime<Utc>,
    /// Terminal revocation flag.
    pub revoked: bool,
    /// Creation time of the session.
    pub created_at: DateTime<Utc>,
    /// Last successful rotation, if any.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Client IP captured at login.
    pub client_ip: String,
    /// User agent captured at login.
    pub user_agent: String,
}

impl SessionRecord {
    /// Whether the current secret is past its expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Whether the session can still be rotated.
    pub fn is_active(&self) -> bool {
        !self.revoked && !self.is_expired()
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// The opaque refresh secret handed to the client. Shown exactly once.
    pub refresh_secret: String,
    /// A freshly minted access token.
    pub access_token: String,
    /// The persisted row.
    pub record: SessionRecord,
}

/// Result of a successful rotation.
#[derive(Debug, Clone)]
pub struct RotatedSession {
    /// The replacement refresh secret. The old one is now permanently dead.
    pub refresh_secret: String,
    /// A freshly minted access token.
    pub access_token: String,
}

/// Issues, rotates, and revokes refresh sessions against an injected store.
pub struct SessionService<S> {
    store: S,
    issuer: TokenIssuer,
    lifetime: Duration,
}

impl<S: SessionStore> SessionService<S> {
    /// Create a service with the default 7-day session lifetime.
    pub fn new(store: S, issuer: TokenIssuer) -> Self {
        Self {
            store,
            issuer,
            lifetime: Duration::seconds(REFRESH_LIFETIME_SECS),
        }
    }

    /// Override the session lifetime.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Open a new session at login.
    ///
    /// # Errors
    ///
    /// `AuthError::Validation` for empty subject id or email;
    /// `AuthError::Store` if the row cannot be persisted.
    pub fn issue(
        &self,
        subject_id: &str,
        email: &str,
        name: &str,
        meta: ClientMeta,
    ) -> Result<IssuedSession> {
        if subject_id.trim().is_empty() {
            return Err(AuthError::Validation("subject id must not be empty".into()));
        }
        if email.trim().is_empty() {
            return Err(AuthError::Validation("email must not be empty".into()));
        }

        let secret = crypto::random_secret();
        let now = Utc::now();
        let record = SessionRecord {
            id: crypto::random_jti(),
            subject_id: subject_id.to_string(),
            email: email.to_string(),
            display_name: name.to_string(),
            jti: crypto::random_jti(),
            secret_digest: crypto::secret_digest_hex(&secret),
            expires_at: now + self.lifetime,
            revoked: false,
            created_at: now,
            last_used_at: None,
            client_ip: meta.ip,
            user_agent: meta.user_agent,
        };

        self.store.insert(&record)?;
        let access_token = self.issuer.issue(subject_id, email, name)?;

        info!(session = %record.id, subject = %record.subject_id, "session issued");
        Ok(IssuedSession {
            refresh_secret: secret,
            access_token,
            record,
        })
    }

    /// Exchange a refresh secret for a new secret and access token.
    ///
    /// The old secret is consumed atomically: of two concurrent rotations
    /// with the same secret, exactly one succeeds and the other fails with
    /// `AuthError::Invalid`.
    ///
    /// # Errors
    ///
    /// - `AuthError::Invalid` — unknown secret, or lost the rotation race.
    /// - `AuthError::Expired` — session past its expiry.
    /// - `AuthError::Revoked` — session was revoked.
    /// - `AuthError::Store` — backing store failure; the request fails.
    pub fn rotate(&self, old_secret: &str) -> Result<RotatedSession> {
        let old_digest = crypto::secret_digest_hex(old_secret);
        let record = self
            .store
            .find_by_digest(&old_digest)?
            .ok_or(AuthError::Invalid)?;

        if record.is_expired() {
            debug!(session = %record.id, "rotation rejected: expired");
            return Err(AuthError::Expired);
        }
        if record.revoked {
            debug!(session = %record.id, "rotation rejected: revoked");
            return Err(AuthError::Revoked);
        }

        // Serialization point: only one caller removes the old binding.
        if !self.store.claim_digest(&old_digest, &record.id)? {
            debug!(session = %record.id, "rotation rejected: lost race");
            return Err(AuthError::Invalid);
        }

        let secret = crypto::random_secret();
        let new_digest = crypto::secret_digest_hex(&secret);
        let now = Utc::now();

        let mut updated = record;
        updated.secret_digest = new_digest.clone();
        updated.expires_at = now + self.lifetime;
        updated.last_used_at = Some(now);
        updated.jti = crypto::random_jti();

        self.store.update(&updated)?;
        self.store.bind_digest(&new_digest, &updated.id)?;

        let access_token =
            self.issuer
                .issue(&updated.subject_id, &updated.email, &updated.display_name)?;

        info!(session = %updated.id, "session rotated");
        Ok(RotatedSession {
            refresh_secret: secret,
            access_token,
        })
    }

    /// Revoke the session owning this secret.
    ///
    /// Idempotent: revoking an unknown or already-revoked secret succeeds,
    /// so the endpoint leaks nothing about which secrets exist.
    pub fn revoke(&self, secret: &str) -> Result<()> {
        let digest = crypto::secret_digest_hex(secret);
        match self.store.find_by_digest(&digest)? {
            None => {
                debug!("revoke for unknown secret ignored");
                Ok(())
            }
            Some(mut record) => {
                if !record.revoked {
                    record.revoked = true;
                    self.store.update(&record)?;
                    info!(session = %record.id, "session revoked");
                }
                Ok(())
            }
        }
    }

    /// Delete rows past their expiry. Housekeeping only; expiry is already
    /// enforced on every rotation.
    pub fn purge_expired(&self) -> Result<usize> {
        self.store.purge_expired(Utc::now())
    }
}

impl<S> std::fmt::Debug for SessionService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}
