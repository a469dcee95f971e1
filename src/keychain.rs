//! OS keychain integration for caching the Secret Server password.
//!
//! The keychain is used as a **cache only**: a password typed at the prompt
//! is stored with a timestamp so that later `zanzibar` invocations against
//! the same server and account don't prompt again until the TTL expires.
//!
//! Entry key format: `{endpoint}:{domain}\{username}`
//!
//! All keychain errors are treated as non-fatal: if the keychain is
//! unavailable (headless session, locked keychain) zanzibar falls back to
//! prompting.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Service name used for all zanzibar keychain entries.
const SERVICE: &str = "zanzibar";

/// A cached password with a timestamp for TTL enforcement.
#[derive(Serialize, Deserialize)]
struct CachedValue {
    value: String,
    stored_at: i64, // Unix timestamp (seconds)
}

/// Build the keyring "user" field for a server account.
fn entry_user(endpoint: &str, domain: &str, username: &str) -> String {
    format!("{}:{}\\{}", endpoint, domain, username)
}

/// True when a value stored at `stored_at` is still usable at `now`.
fn is_fresh(stored_at: i64, now: i64, ttl_secs: u64) -> bool {
    let age = now - stored_at;
    age >= 0 && (age as u64) <= ttl_secs
}

/// Store a password in the OS keychain.
///
/// Silently returns on any error.
pub fn keychain_store(endpoint: &str, domain: &str, username: &str, password: &str) {
    let user = entry_user(endpoint, domain, username);
    let cached = CachedValue {
        value: password.to_string(),
        stored_at: chrono::Utc::now().timestamp(),
    };
    let json = match serde_json::to_string(&cached) {
        Ok(j) => j,
        Err(_) => return,
    };
    if let Ok(entry) = keyring::Entry::new(SERVICE, &user)
        && entry.set_password(&json).is_ok()
    {
        debug!(account = %user, "cached password in keychain");
    }
}

/// Retrieve a cached password from the OS keychain.
///
/// Returns `None` if the entry is missing, older than `ttl_secs`, or any
/// keychain error occurs. Expired entries are removed.
pub fn keychain_retrieve(
    endpoint: &str,
    domain: &str,
    username: &str,
    ttl_secs: u64,
) -> Option<String> {
    let user = entry_user(endpoint, domain, username);
    let entry = keyring::Entry::new(SERVICE, &user).ok()?;
    let json = entry.get_password().ok()?;
    let cached: CachedValue = serde_json::from_str(&json).ok()?;

    if !is_fresh(cached.stored_at, chrono::Utc::now().timestamp(), ttl_secs) {
        let _ = entry.delete_credential();
        return None;
    }

    Some(cached.value)
}

/// Delete the cached password for a server account.
///
/// Silently ignores errors (entry not found, keychain locked, etc.).
pub fn keychain_delete(endpoint: &str, domain: &str, username: &str) {
    let user = entry_user(endpoint, domain, username);
    if let Ok(entry) = keyring::Entry::new(SERVICE, &user)
        && entry.delete_credential().is_ok()
    {
        debug!(account = %user, "removed cached password from keychain");
    }
}
