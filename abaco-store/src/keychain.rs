//! API token storage in the system keychain.
//!
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! Tokens are keyed by base URL so that a staging and a production account
//! can coexist.

use keyring::Entry;
use tracing::debug;

use crate::error::StoreError;

/// Keychain service name.
const SERVICE: &str = "abaco";

fn entry(base_url: &str) -> Result<Entry, StoreError> {
    Entry::new(SERVICE, &account_name(base_url))
        .map_err(|e| StoreError::Keychain(format!("Failed to open keychain entry: {e}")))
}

/// Keychain account name for a base URL.
fn account_name(base_url: &str) -> String {
    format!("api_token@{}", base_url.trim().trim_end_matches('/'))
}

/// Stores a token for `base_url`, replacing any previous one.
pub fn store_token(base_url: &str, token: &str) -> Result<(), StoreError> {
    entry(base_url)?
        .set_password(token)
        .map_err(|e| StoreError::Keychain(format!("Failed to store API token: {e}")))?;
    debug!(base_url, "API token stored in keychain");
    Ok(())
}

/// Loads the token for `base_url`.
///
/// `Ok(None)` when nothing (or an empty string) is stored.
pub fn load_token(base_url: &str) -> Result<Option<String>, StoreError> {
    match entry(base_url)?.get_password() {
        Ok(token) if token.trim().is_empty() => Ok(None),
        Ok(token) => {
            debug!(base_url, "API token loaded from keychain");
            Ok(Some(token))
        }
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(StoreError::Keychain(format!("Failed to read API token: {e}"))),
    }
}

/// Deletes the token for `base_url`. Deleting a missing token succeeds.
pub fn delete_token(base_url: &str) -> Result<(), StoreError> {
    match entry(base_url)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => {
            debug!(base_url, "API token removed from keychain");
            Ok(())
        }
        Err(e) => Err(StoreError::Keychain(format!("Failed to delete API token: {e}"))),
    }
}
