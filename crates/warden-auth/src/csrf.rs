//! Single-use CSRF tokens for the double-submit cookie pattern.
//!
//! The service hands out 256-bit random values and remembers them in an
//! expiring cache keyed by the value itself. Validation atomically consumes
//! the entry: a token that validated once can never validate again. That
//! single-use property is what makes the double-submit pattern hold — a
//! token valid twice would let a captured value be replayed.
//!
//! The cookie carrying this value is deliberately NOT HttpOnly (client
//! script must read it and echo it in a header), unlike the refresh-token
//! cookie which is. The asymmetry is required by the pattern, not an
//! oversight.
//!
//! Validation never fails with an error. Empty, unknown, expired, and
//! cache-unavailable all collapse to `false` with a warning log — the
//! submitted token is never echoed back.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::crypto;
use crate::error::Result;

/// Default CSRF token lifetime (60 minutes).
pub const DEFAULT_CSRF_TTL: Duration = Duration::from_secs(3600);

/// Entry count above which [`MemoryCache`] sweeps expired entries on write.
const SWEEP_THRESHOLD: usize = 1024;

/// Expiring key-presence cache consumed by [`CsrfService`].
///
/// An injected capability: the in-memory implementation below serves a
/// single process, and a multi-instance deployment substitutes a shared
/// cache. `take` must be atomic — present-then-delete as one operation.
pub trait ExpiringCache: Send + Sync {
    /// Remember `key` for `ttl`.
    fn put(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Atomically remove `key`, returning whether it was present and
    /// unexpired. A second `take` of the same key always returns `false`.
    fn take(&self, key: &str) -> Result<bool>;
}

/// In-memory [`ExpiringCache`] for single-process deployments and tests.
///
/// Known scaling limitation: tokens generated on one instance cannot be
/// validated on another. Horizontal deployments need a shared cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Instant>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
        // A poisoned lock only means another thread panicked mid-write;
        // the map itself is still usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ExpiringCache for MemoryCache {
    fn put(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.lock();
        if entries.len() >= SWEEP_THRESHOLD {
            let now = Instant::now();
            entries.retain(|_, deadline| *deadline > now);
        }
        entries.insert(key.to_string(), Instant::now() + ttl);
        Ok(())
    }

    fn take(&self, key: &str) -> Result<bool> {
        match self.lock().remove(key) {
            Some(deadline) => Ok(Instant::now() < deadline),
            None => Ok(false),
        }
    }
}

/// Generates and validates single-use anti-forgery tokens.
pub struct CsrfService<C> {
    cache: C,
    ttl: Duration,
}

impl<C: ExpiringCache> CsrfService<C> {
    /// Create a service with the default 60-minute TTL.
    pub fn new(cache: C) -> Self {
        Self {
            cache,
            ttl: DEFAULT_CSRF_TTL,
        }
    }

    /// Override the token TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Generate a fresh token and remember it.
    pub fn generate(&self) -> Result<String> {
        let token = crypto::random_secret();
        self.cache.put(&token, self.ttl)?;
        Ok(token)
    }

    /// Validate and consume a token.
    ///
    /// Returns `false` for empty, unknown, expired, or replayed tokens and
    /// when the cache is unreachable. Never returns an error and never logs
    /// the submitted value.
    pub fn validate(&self, token: &str) -> bool {
        if token.is_empty() {
            warn!("empty csrf token rejected");
            return false;
        }
        match self.cache.take(token) {
            Ok(true) => true,
            Ok(false) => {
                warn!("unknown or expired csrf token rejected");
                false
            }
            Err(err) => {
                warn!(error = %err, "csrf cache unavailable, token rejected");
                false
            }
        }
    }
}

impl<C> std::fmt::Debug for CsrfService<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfService").field("ttl", &self.ttl).finish()
    }
}
