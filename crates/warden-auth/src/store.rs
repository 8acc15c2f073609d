//! Persistent session storage.
//!
//! Refresh sessions live in a Sled database with two trees:
//!
//! | Tree | Key | Value | Purpose |
//! |------|-----|-------|---------|
//! | `sessions` | session id | serialized [`SessionRecord`] | Row storage |
//! | `secrets` | secret digest (hex) | session id | Lookup + rotation lock |
//!
//! The `secrets` tree doubles as the rotation serialization point:
//! [`SessionStore::claim_digest`] is a compare-and-swap removal of the
//! digest binding, so two racing rotations of the same secret resolve to
//! exactly one winner without any row-level locking.
//!
//! The trait exists so the services can be handed an injected capability:
//! tests use [`SledSessionStore::temporary`], and a horizontally scaled
//! deployment can substitute a shared store without touching the services.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{AuthError, Result};
use crate::session::SessionRecord;

/// Tree name for session rows.
const SESSION_TREE: &str = "sessions";

/// Tree name for the secret-digest bindings.
const SECRET_TREE: &str = "secrets";

/// Storage capability consumed by [`crate::SessionService`].
///
/// All methods are infallible-on-success lookups or atomic writes; any
/// backend failure surfaces as [`AuthError::Store`] and aborts the request.
pub trait SessionStore: Send + Sync {
    /// Persist a new session row and bind its secret digest.
    fn insert(&self, record: &SessionRecord) -> Result<()>;

    /// Load a session row by id.
    fn get(&self, id: &str) -> Result<Option<SessionRecord>>;

    /// Load the session row currently bound to a secret digest.
    fn find_by_digest(&self, digest: &str) -> Result<Option<SessionRecord>>;

    /// Atomically remove the binding `digest -> session_id`.
    ///
    /// Returns `true` only for the single caller that actually removed the
    /// binding. Every concurrent caller observes `false`.
    fn claim_digest(&self, digest: &str, session_id: &str) -> Result<bool>;

    /// Bind a freshly rotated secret digest to a session.
    fn bind_digest(&self, digest: &str, session_id: &str) -> Result<()>;

    /// Overwrite a session row in place.
    fn update(&self, record: &SessionRecord) -> Result<()>;

    /// Remove rows past their expiry. Returns the number of rows removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// Sled-backed [`SessionStore`].
///
/// The underlying database is thread-safe and cheap to clone; clones share
/// the same trees.
#[derive(Clone)]
pub struct SledSessionStore {
    db: sled::Db,
    sessions: sled::Tree,
    secrets: sled::Tree,
}

impl SledSessionStore {
    /// Open or create a session database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary in-memory store for testing. Data is lost when
    /// the store is dropped.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self> {
        let sessions = db.open_tree(SESSION_TREE)?;
        let secrets = db.open_tree(SECRET_TREE)?;
        Ok(Self {
            db,
            sessions,
            secrets,
        })
    }

    /// Number of stored session rows.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }
}

impl SessionStore for SledSessionStore {
    fn insert(&self, record: &SessionRecord) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        self.sessions.insert(record.id.as_bytes(), bytes)?;
        self.secrets
            .insert(record.secret_digest.as_bytes(), record.id.as_bytes())?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<SessionRecord>> {
        match self.sessions.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn find_by_digest(&self, digest: &str) -> Result<Option<SessionRecord>> {
        let id = match self.secrets.get(digest.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map_err(|_| AuthError::Store("corrupt secret binding".into()))?,
            None => return Ok(None),
        };
        self.get(&id)
    }

    fn claim_digest(&self, digest: &str, session_id: &str) -> Result<bool> {
        let swap = self.secrets.compare_and_swap(
            digest.as_bytes(),
            Some(session_id.as_bytes()),
            None::<&[u8]>,
        )?;
        Ok(swap.is_ok())
    }

    fn bind_digest(&self, digest: &str, session_id: &str) -> Result<()> {
        self.secrets
            .insert(digest.as_bytes(), session_id.as_bytes())?;
        Ok(())
    }

    fn update(&self, record: &SessionRecord) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        self.sessions.insert(record.id.as_bytes(), bytes)?;
        Ok(())
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut purged = 0;
        for entry in self.sessions.iter() {
            let (key, bytes) = entry?;
            let record: SessionRecord = serde_json::from_slice(&bytes)?;
            if now > record.expires_at {
                self.sessions.remove(&key)?;
                self.secrets.remove(record.secret_digest.as_bytes())?;
                purged += 1;
            }
        }
        Ok(purged)
    }
}

impl std::fmt::Debug for SledSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledSessionStore")
            .field("sessions", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto;
    use chrono::Duration;

    fn record(id: &str, digest: &str, expires_in: Duration) -> SessionRecord {
        let now = Utc::now();
        SessionRecord {
            id: id.to_string(),
            subject_id: "user-1".to_string(),
            email: "user@example.com".to_string(),
            display_name: "User".to_string(),
            jti: crypto::random_jti(),
            secret_digest: digest.to_string(),
            expires_at: now + expires_in,
            revoked: false,
            created_at: now,
            last_used_at: None,
            client_ip: "127.0.0.1".to_string(),
            user_agent: "test".to_string(),
        }
    }

    #[test]
    fn test_insert_and_find_by_digest() {
        let store = SledSessionStore::temporary().unwrap();
        let rec = record("s-1", "digest-1", Duration::days(7));

        store.insert(&rec).unwrap();

        let found = store.find_by_digest("digest-1").unwrap().unwrap();
        assert_eq!(found.id, "s-1");
        assert_eq!(found.subject_id, "user-1");
        assert!(store.find_by_digest("digest-2").unwrap().is_none());
    }

    #[test]
    fn test_claim_digest_single_winner() {
        let store = SledSessionStore::temporary().unwrap();
        store.insert(&record("s-1", "digest-1", Duration::days(7))).unwrap();

        assert!(store.claim_digest("digest-1", "s-1").unwrap());
        // Second claim of the same digest loses.
        assert!(!store.claim_digest("digest-1", "s-1").unwrap());
        // And the binding is gone.
        assert!(store.find_by_digest("digest-1").unwrap().is_none());
    }

    #[test]
    fn test_claim_digest_wrong_session_loses() {
        let store = SledSessionStore::temporary().unwrap();
        store.insert(&record("s-1", "digest-1", Duration::days(7))).unwrap();

        assert!(!store.claim_digest("digest-1", "s-other").unwrap());
        // Binding untouched by the failed claim.
        assert!(store.find_by_digest("digest-1").unwrap().is_some());
    }

    #[test]
    fn test_rebind_after_claim() {
        let store = SledSessionStore::temporary().unwrap();
        let mut rec = record("s-1", "digest-1", Duration::days(7));
        store.insert(&rec).unwrap();

        assert!(store.claim_digest("digest-1", "s-1").unwrap());
        rec.secret_digest = "digest-2".to_string();
        store.update(&rec).unwrap();
        store.bind_digest("digest-2", "s-1").unwrap();

        assert!(store.find_by_digest("digest-1").unwrap().is_none());
        let found = store.find_by_digest("digest-2").unwrap().unwrap();
        assert_eq!(found.id, "s-1");
    }

    #[test]
    fn test_update_overwrites_in_place() {
        let store = SledSessionStore::temporary().unwrap();
        let mut rec = record("s-1", "digest-1", Duration::days(7));
        store.insert(&rec).unwrap();

        rec.revoked = true;
        store.update(&rec).unwrap();

        assert!(store.get("s-1").unwrap().unwrap().revoked);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_purge_expired() {
        let store = SledSessionStore::temporary().unwrap();
        store.insert(&record("live", "d-live", Duration::days(7))).unwrap();
        store.insert(&record("dead", "d-dead", Duration::seconds(-5))).unwrap();

        let purged = store.purge_expired(Utc::now()).unwrap();

        assert_eq!(purged, 1);
        assert!(store.get("live").unwrap().is_some());
        assert!(store.get("dead").unwrap().is_none());
        assert!(store.find_by_digest("d-dead").unwrap().is_none());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sessions.db");

        {
            let store = SledSessionStore::open(&path).unwrap();
            store.insert(&record("s-1", "digest-1", Duration::days(7))).unwrap();
            store.flush().unwrap();
        }

        let store = SledSessionStore::open(&path).unwrap();
        assert!(store.find_by_digest("digest-1").unwrap().is_some());
    }
}
