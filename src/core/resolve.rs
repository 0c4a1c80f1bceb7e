//! Deciding which remote tools are exposed to a caller.

use super::client::McpdClient;
use super::error::{McpdError, Result};
use super::function::ToolFunction;

/// Selection applied by [`McpdClient::agent_tools`].
///
/// `None` means "no restriction"; an empty list selects nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFilter {
    pub servers: Option<Vec<String>>,
    pub tools: Option<Vec<String>>,
    pub check_health: bool,
}

impl Default for ToolFilter {
    fn default() -> Self {
        Self {
            servers: None,
            tools: None,
            check_health: true,
        }
    }
}

impl ToolFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only consider these servers.
    #[must_use]
    pub fn servers<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.servers = Some(servers.into_iter().map(Into::into).collect());
        self
    }

    /// Only keep tools whose bare or qualified name is listed.
    #[must_use]
    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn check_health(mut self, check: bool) -> Self {
        self.check_health = check;
        self
    }

    /// Whether `function` passes the tool-name filter.
    ///
    /// Names are compared whole, never split on the qualifier.
    #[must_use]
    pub fn matches(&self, function: &ToolFunction) -> bool {
        self.tools.as_ref().is_none_or(|names| {
            names
                .iter()
                .any(|n| n == function.tool_name() || n == function.name())
        })
    }
}

impl McpdClient {
    /// Generated functions for every exposed tool.
    ///
    /// Servers are taken from the filter or the daemon, unhealthy ones are
    /// dropped when `check_health` is set, then every tool of every remaining
    /// server is materialized before the name filter runs. Order follows the
    /// server order, then each server's definition order.
    ///
    /// # Errors
    ///
    /// Propagates listing failures and health failures other than
    /// [`McpdError::ServerNotFound`] and [`McpdError::ServerUnhealthy`].
    pub fn agent_tools(&self, filter: &ToolFilter) -> Result<Vec<ToolFunction>> {
        let servers = match &filter.servers {
            Some(servers) if servers.is_empty() => return Ok(Vec::new()),
            Some(servers) => servers.clone(),
            None => self.servers()?,
        };

        let servers = if filter.check_health {
            self.healthy_servers(servers)?
        } else {
            servers
        };

        let mut functions = Vec::new();
        for server in &servers {
            let definitions = match self.tools(server) {
                Ok(definitions) => definitions,
                Err(McpdError::ServerNotFound { .. }) => {
                    tracing::warn!(server = %server, "skipping unknown server");
                    continue;
                }
                Err(e) => return Err(e),
            };
            functions.extend(
                definitions
                    .iter()
                    .map(|definition| self.functions().create_function(definition, server)),
            );
        }

        functions.retain(|function| filter.matches(function));
        tracing::debug!(
            servers = servers.len(),
            tools = functions.len(),
            "resolved agent tools"
        );
        Ok(functions)
    }

    /// Keep the servers whose health status is `ok`, in the given order.
    ///
    /// # Errors
    ///
    /// Propagates any health failure except a missing or unhealthy server.
    pub fn healthy_servers(&self, servers: Vec<String>) -> Result<Vec<String>> {
        let mut healthy = Vec::with_capacity(servers.len());
        for server in servers {
            match self.ensure_server_healthy(&server) {
                Ok(()) => healthy.push(server),
                Err(e @ (McpdError::ServerNotFound { .. } | McpdError::ServerUnhealthy { .. })) => {
                    tracing::warn!(server = %server, reason = %e, "skipping server");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(healthy)
    }
}
