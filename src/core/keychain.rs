//! API keys stored in the system keychain, one entry per daemon endpoint.

use keyring::Entry;

const SERVICE_NAME: &str = "mcpd-sdk";

pub fn store_api_key(endpoint: &str, api_key: &str) -> anyhow::Result<()> {
    let entry = Entry::new(SERVICE_NAME, endpoint)?;
    entry.set_password(api_key)?;
    tracing::debug!(endpoint = %endpoint, "stored api key in keychain");
    Ok(())
}

pub fn get_api_key(endpoint: &str) -> Option<String> {
    let entry = Entry::new(SERVICE_NAME, endpoint).ok()?;
    entry.get_password().ok()
}

/// Remove the stored key. Returns `false` if there was none.
pub fn delete_api_key(endpoint: &str) -> anyhow::Result<bool> {
    let entry = Entry::new(SERVICE_NAME, endpoint)?;
    match entry.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
