//! # Warden Auth - Token Lifecycle & CSRF Defense
//!
//! This crate owns every credential the chat platform hands out: short-lived
//! signed access tokens, long-lived rotating refresh tokens, and single-use
//! CSRF tokens for the double-submit cookie pattern.
//!
//! ## Threat Model
//!
//! | Threat | Defense |
//! |--------|---------|
//! | Access token forgery | HMAC-SHA256 signature, constant-time verification |
//! | Refresh token replay | Single-use rotation: the old secret dies the moment it is exchanged |
//! | Stolen token database | Only SHA-256 digests of refresh secrets are persisted |
//! | Concurrent rotation race | Compare-and-swap on the digest binding: exactly one winner |
//! | CSRF | 256-bit single-use tokens; validation atomically consumes the entry |
//! | Validity oracles | Revoking unknown tokens succeeds; auth failures share one generic message |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        WARDEN AUTH                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌──────────────┐   ┌────────────────┐   ┌──────────────┐   │
//! │  │ TokenIssuer  │   │ SessionService │   │ CsrfService  │   │
//! │  │              │   │                │   │              │   │
//! │  │ HMAC claims  │   │ issue / rotate │   │  generate /  │   │
//! │  │ 15 min TTL   │   │ revoke, 7 days │   │  validate    │   │
//! │  └──────────────┘   └───────┬────────┘   └──────┬───────┘   │
//! │                             │                   │           │
//! │                             ▼                   ▼           │
//! │                     ┌──────────────┐    ┌──────────────┐    │
//! │                     │ SessionStore │    │ ExpiringCache│    │
//! │                     │ (sled-backed)│    │ (in-memory)  │    │
//! │                     └──────────────┘    └──────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! `SessionStore` and `ExpiringCache` are injected capabilities: tests swap
//! in temporary instances, and a multi-instance deployment swaps in a shared
//! store without touching the services. The in-memory CSRF cache is a
//! single-process reference implementation and a known scaling limitation.
//!
//! ## Security Notes
//!
//! - Store failures are fatal to the request. Nothing in this crate
//!   authenticates a caller when the backing store cannot be reached.
//! - No internal retries: retrying `rotate` without an idempotency key
//!   could consume a secret twice.
//! - Revocation takes effect on the next refresh. Outstanding access
//!   tokens are self-contained, so the practical exposure window after a
//!   revoke is bounded by the access-token lifetime (15 minutes).

mod access;
mod crypto;
mod csrf;
mod error;
mod session;
mod store;

pub use access::{AccessClaims, TokenIssuer, ACCESS_LIFETIME_SECS};
pub use crypto::{random_jti, random_secret, secret_digest_hex};
pub use csrf::{CsrfService, ExpiringCache, MemoryCache, DEFAULT_CSRF_TTL};
pub use error::{AuthError, Result};
pub use session::{
    ClientMeta, IssuedSession, RotatedSession, SessionRecord, SessionService,
    REFRESH_LIFETIME_SECS,
};
pub use store::{SessionStore, SledSessionStore};
