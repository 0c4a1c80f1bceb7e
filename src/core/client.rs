//! Client for an mcpd daemon.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::dynamic::DynamicCaller;
use super::error::{McpdError, Result};
use super::function::FunctionBuilder;
use super::health::{CacheTtl, HealthCache};
use super::transport::{Daemon, HttpDaemon};
use super::types::{ServerHealth, ToolDefinition};
use crate::config::Config;

/// Normalize a daemon address: trims whitespace and trailing slashes.
///
/// # Errors
///
/// Returns a configuration error if nothing is left.
pub fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.is_empty() {
        return Err(McpdError::Config("api endpoint must be set".to_string()));
    }
    Ok(endpoint.to_string())
}

/// Client for discovering and calling MCP tools through an mcpd daemon.
///
/// Owns the generated-function cache and the health cache; both are safe to
/// use from several threads at once.
///
/// ```no_run
/// use mcpd_sdk::McpdClient;
/// use serde_json::json;
///
/// let client = McpdClient::new("http://localhost:8090", None)?;
/// println!("{:?}", client.servers()?);
///
/// let args = json!({"timezone": "UTC"}).as_object().cloned().unwrap_or_default();
/// let now = client.call().server("time").tool("get_current_time")?.call(args)?;
/// println!("{now}");
/// # Ok::<(), mcpd_sdk::McpdError>(())
/// ```
pub struct McpdClient {
    daemon: Arc<dyn Daemon>,
    functions: FunctionBuilder,
    health: HealthCache,
}

impl std::fmt::Debug for McpdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpdClient")
            .field("cached_functions", &self.functions.cached())
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}

impl McpdClient {
    /// Create a client for the daemon at `endpoint` with the default health TTL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint is empty or invalid.
    pub fn new(endpoint: &str, api_key: Option<&str>) -> Result<Self> {
        let endpoint = normalize_endpoint(endpoint)?;
        let daemon = HttpDaemon::new(&endpoint, api_key)?;
        Ok(Self::with_daemon(Arc::new(daemon), CacheTtl::default()))
    }

    /// Create a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty endpoint or invalid TTL.
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = normalize_endpoint(&config.endpoint)?;
        let ttl = config.cache_ttl()?;
        let daemon = HttpDaemon::new(&endpoint, config.api_key.as_deref())?;
        tracing::debug!(endpoint = %endpoint, ttl = ttl.as_secs_f64(), "created mcpd client");
        Ok(Self::with_daemon(Arc::new(daemon), ttl))
    }

    /// Create a client over any [`Daemon`] implementation.
    #[must_use]
    pub fn with_daemon(daemon: Arc<dyn Daemon>, ttl: CacheTtl) -> Self {
        Self {
            functions: FunctionBuilder::new(Arc::clone(&daemon)),
            health: HealthCache::new(ttl),
            daemon,
        }
    }

    pub(crate) fn functions(&self) -> &FunctionBuilder {
        &self.functions
    }

    /// TTL applied to cached health records.
    #[must_use]
    pub const fn health_cache_ttl(&self) -> CacheTtl {
        self.health.ttl()
    }

    /// Names of all servers behind the daemon.
    pub fn servers(&self) -> Result<Vec<String>> {
        self.daemon.list_servers()
    }

    /// Tool definitions advertised by `server`.
    pub fn tools(&self, server: &str) -> Result<Vec<ToolDefinition>> {
        self.daemon.list_tools(server)
    }

    /// Tool definitions for every server, in server listing order.
    pub fn all_tools(&self) -> Result<Vec<(String, Vec<ToolDefinition>)>> {
        let collect = || -> Result<Vec<_>> {
            self.servers()?
                .into_iter()
                .map(|server| {
                    let tools = self.tools(&server)?;
                    Ok((server, tools))
                })
                .collect()
        };
        collect().map_err(|e| e.context("could not retrieve all tool definitions"))
    }

    /// Run `tool` on `server` with `params`.
    pub fn perform_call(
        &self,
        server: &str,
        tool: &str,
        params: &Map<String, Value>,
    ) -> Result<Value> {
        tracing::debug!(server = %server, tool = %tool, "calling tool");
        self.daemon.call_tool(server, tool, params)
    }

    /// Whether `server` exposes `tool`. Any failure counts as `false`.
    #[must_use]
    pub fn has_tool(&self, server: &str, tool: &str) -> bool {
        match self.tools(server) {
            Ok(tools) => tools.iter().any(|t| t.name == tool),
            Err(e) => {
                tracing::debug!(server = %server, error = %e, "tool lookup failed");
                false
            }
        }
    }

    /// Health of `server`, served from the health cache when fresh.
    pub fn server_health(&self, server: &str) -> Result<ServerHealth> {
        self.health
            .get_or_fetch(server, || self.daemon.server_health(server))
    }

    /// Health of every server in one request, keyed by server name.
    ///
    /// Always asks the daemon, and refreshes the health cache with what it
    /// returns.
    pub fn all_server_health(&self) -> Result<BTreeMap<String, ServerHealth>> {
        let records = self
            .daemon
            .all_server_health()
            .map_err(|e| e.context("could not retrieve all health information"))?;

        Ok(records
            .into_iter()
            .map(|record| {
                self.health.insert(&record.name, Ok(record.clone()));
                (record.name.clone(), record)
            })
            .collect())
    }

    /// Fail with [`McpdError::ServerUnhealthy`] unless `server` reports `ok`.
    pub fn ensure_server_healthy(&self, server: &str) -> Result<()> {
        let health = self.server_health(server)?;
        if health.is_healthy() {
            Ok(())
        } else {
            Err(McpdError::ServerUnhealthy {
                server: server.to_string(),
                status: health.status.to_string(),
            })
        }
    }

    /// Whether `server` is healthy. Any failure counts as `false`.
    #[must_use]
    pub fn is_server_healthy(&self, server: &str) -> bool {
        self.ensure_server_healthy(server).is_ok()
    }

    /// Drop cached tool functions so the next resolution rebuilds them.
    pub fn clear_agent_tools_cache(&self) {
        self.functions.clear_cache();
    }

    /// Forget the cached health of `server`.
    pub fn invalidate_server_health(&self, server: &str) -> bool {
        self.health.invalidate(server)
    }

    /// Forget all cached health.
    pub fn clear_server_health_cache(&self) {
        self.health.clear();
    }

    /// Dynamic `server → tool → call` interface.
    #[must_use]
    pub const fn call(&self) -> DynamicCaller<'_> {
        DynamicCaller::new(self)
    }
}
