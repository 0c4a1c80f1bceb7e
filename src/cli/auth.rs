//! `auth` subcommands: API keys kept in the system keychain per endpoint.

use dialoguer::{Password, theme::ColorfulTheme};

use crate::core::{keychain, normalize_endpoint};

use super::LoginArgs;

pub fn auth_login(endpoint: &str, args: LoginArgs) -> anyhow::Result<()> {
    let endpoint = normalize_endpoint(endpoint)?;

    let api_key = match args.api_key {
        Some(key) => validate_key(key)?,
        None => prompt_api_key(&endpoint)?,
    };

    keychain::store_api_key(&endpoint, &api_key)?;

    println!("Stored API key for {endpoint} in system keychain");
    Ok(())
}

pub fn auth_logout(endpoint: &str) -> anyhow::Result<()> {
    let endpoint = normalize_endpoint(endpoint)?;

    if keychain::delete_api_key(&endpoint)? {
        println!("Removed API key for {endpoint}");
    } else {
        println!("No API key stored for {endpoint}");
    }
    Ok(())
}

fn validate_key(key: String) -> anyhow::Result<String> {
    let key = key.trim().to_string();
    if key.is_empty() {
        anyhow::bail!("API key cannot be empty");
    }
    Ok(key)
}

fn prompt_api_key(endpoint: &str) -> anyhow::Result<String> {
    let api_key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Enter API key for {endpoint}"))
        .interact()?;

    validate_key(api_key)
}
