//! Privacy-preserving username tags.
//!
//! Account names leave this core only as short salted-hash tags: stable
//! enough to correlate failures across probes on one host, useless for
//! recovering the account name without the salt.

use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};

/// Compile-time default salt. Deployments are expected to rotate it via
/// configuration before the first probe; tags are only stable per salt.
const DEFAULT_SALT: &str = "sentinel_default_salt";

static SALT: OnceCell<String> = OnceCell::new();

/// Overrides the process-wide hashing salt.
///
/// Accepted at most once, before any probe runs; later calls are rejected
/// so that one probe never mixes tags from two salts.
pub fn set_hash_salt(salt: impl Into<String>) -> bool {
    let accepted = SALT.set(salt.into()).is_ok();
    if !accepted {
        tracing::warn!("Hash salt already set; override ignored");
    }
    accepted
}

fn salt() -> &'static str {
    SALT.get().map(String::as_str).unwrap_or(DEFAULT_SALT)
}

/// Hashes a username into the fixed-shape tag `user_XXXX`.
///
/// `XXXX` is the first 4 hex characters of `sha256("<salt>:<username>")`.
pub fn hash_username(username: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt().as_bytes());
    hasher.update(b":");
    hasher.update(username.as_bytes());
    let digest = hasher.finalize();
    format!("user_{:02x}{:02x}", digest[0], digest[1])
}
