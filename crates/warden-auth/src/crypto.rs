//! Cryptographic primitives shared by the token services.
//!
//! Thin wrappers over `rand`, `sha2`, and `hmac` so the rest of the crate
//! never touches raw cryptography. Signature verification is constant-time
//! via [`Mac::verify_slice`] to avoid timing oracles.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Length of opaque secrets in bytes (256 bits).
pub const SECRET_LEN: usize = 32;

/// Generate an opaque 256-bit secret, URL-safe base64 encoded.
///
/// Used for refresh-token secrets and CSRF token values. Entropy comes from
/// the operating system RNG.
pub fn random_secret() -> String {
    let mut buf = [0u8; SECRET_LEN];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// Generate a unique token identifier (UUIDv4, hyphenated).
pub fn random_jti() -> String {
    Uuid::new_v4().as_hyphenated().to_string()
}

/// SHA-256 digest of a secret, hex encoded.
///
/// Stores persist this digest instead of the raw secret, so a leaked
/// database does not yield usable refresh tokens.
pub fn secret_digest_hex(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// HMAC-SHA256 tag over `payload`.
pub fn sign(key: &[u8], payload: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(payload);
    mac.finalize().into_bytes().into()
}

/// Verify an HMAC-SHA256 tag in constant time.
pub fn verify(key: &[u8], payload: &[u8], tag: &[u8]) -> bool {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(payload);
    mac.verify_slice(tag).is_ok()
}

/// URL-safe base64 without padding, shared by the token wire format.
pub(crate) fn b64_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode the URL-safe base64 used by the token wire format.
pub(crate) fn b64_decode(data: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(data).ok()
}
