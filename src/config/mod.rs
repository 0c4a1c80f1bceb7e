//! Configuration for the mcpd SDK and CLI.
//!
//! Values are layered: built-in defaults, then `sdk.toml` in the config
//! directory, then `MCPD_*` environment variables. CLI flags are applied on
//! top by the binary.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::core::health::{CacheTtl, DEFAULT_TTL};
use crate::core::{keychain, normalize_endpoint};

/// Daemon address used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8090";

pub const ENV_ENDPOINT: &str = "MCPD_ADDR";
pub const ENV_API_KEY: &str = "MCPD_API_KEY";
pub const ENV_HEALTH_CACHE_TTL: &str = "MCPD_HEALTH_CACHE_TTL";

/// SDK configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the mcpd daemon.
    pub endpoint: String,

    /// Bearer credential sent with every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Health cache TTL in seconds. `0` disables caching, `inf` never expires.
    pub health_cache_ttl: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            health_cache_ttl: DEFAULT_TTL.as_secs_f64(),
        }
    }
}

impl Config {
    /// Load configuration from the default path and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed,
    /// or an environment override is malformed.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?, |name| std::env::var(name).ok())
    }

    /// Load configuration from `path`, then apply overrides from `env`.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an
    /// override is malformed.
    pub fn load_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env(env)?;
        tracing::debug!(path = %path.display(), endpoint = %config.endpoint, "loaded config");
        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(endpoint) = env(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            self.endpoint = endpoint;
        }
        if let Some(key) = env(ENV_API_KEY).filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(ttl) = env(ENV_HEALTH_CACHE_TTL) {
            self.health_cache_ttl = ttl
                .trim()
                .parse()
                .with_context(|| format!("{ENV_HEALTH_CACHE_TTL} must be a number of seconds"))?;
        }
        Ok(())
    }

    /// The health cache TTL as a validated [`CacheTtl`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error for negative or NaN values.
    pub fn cache_ttl(&self) -> crate::Result<CacheTtl> {
        CacheTtl::from_secs_f64(self.health_cache_ttl)
    }

    /// Fill in the API key from the keychain when none is configured.
    #[must_use]
    pub fn with_keychain_key(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = normalize_endpoint(&self.endpoint)
                .ok()
                .and_then(|endpoint| keychain::get_api_key(&endpoint));
        }
        self
    }

    /// Render as TOML with the API key redacted.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_masked_toml(&self) -> anyhow::Result<String> {
        let mut shown = self.clone();
        shown.api_key = shown.api_key.as_deref().map(crate::core::secret::redact_key);
        Ok(toml::to_string_pretty(&shown)?)
    }

    /// Get the configuration file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("sdk.toml"))
    }

    /// Get the config directory path (`~/.config/mcpd/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg_config_home).join("mcpd"));
        }

        if cfg!(target_os = "macos") {
            if let Ok(home) = std::env::var("HOME") {
                return Ok(PathBuf::from(home).join(".config").join("mcpd"));
            }
        }

        let base = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;

        Ok(base.config_dir().join("mcpd"))
    }
}
