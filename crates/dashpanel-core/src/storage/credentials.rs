//! Thin wrapper around the OS keyring for the API token.

use crate::error::Result;

const SERVICE: &str = "dashpanel";
const TOKEN_KEY: &str = "api_token";

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV: &str = "DASHPANEL_TOKEN";

pub fn get(key: &str) -> Result<Option<String>> {
    let entry = keyring::Entry::new(SERVICE, key)?;
    match entry.get_password() {
        Ok(pw) => Ok(Some(pw)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let entry = keyring::Entry::new(SERVICE, key)?;
    entry.set_password(value)?;
    Ok(())
}

pub fn delete(key: &str) -> Result<()> {
    let entry = keyring::Entry::new(SERVICE, key)?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Resolve the API token: `DASHPANEL_TOKEN` first, then the keyring.
///
/// Keyring failures (no secret service on headless hosts) resolve to `None`.
pub fn api_token() -> Option<String> {
    if let Some(token) = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()) {
        return Some(token);
    }
    match get(TOKEN_KEY) {
        Ok(token) => token,
        Err(e) => {
            tracing::debug!(error = %e, "keyring unavailable, continuing without token");
            None
        }
    }
}

pub fn store_api_token(token: &str) -> Result<()> {
    set(TOKEN_KEY, token)
}

pub fn clear_api_token() -> Result<()> {
    delete(TOKEN_KEY)
}
