//! In-memory daemon for unit tests.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::{Map, Value, json};

use super::error::{McpdError, Result};
use super::transport::Daemon;
use super::types::{HealthStatus, ServerHealth, ToolDefinition};

/// Daemon double that serves fixed servers and logs every request.
#[derive(Default)]
pub struct FakeDaemon {
    servers: Vec<(String, Vec<ToolDefinition>)>,
    health: HashMap<String, HealthStatus>,
    health_error: Mutex<Option<McpdError>>,
    requests: Mutex<Vec<String>>,
    calls: Mutex<Vec<(String, String, Map<String, Value>)>>,
}

impl FakeDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a healthy server whose tools take a single optional `value`.
    pub fn with_server(self, name: &str, tools: &[&str]) -> Self {
        let definitions = tools
            .iter()
            .map(|tool| {
                ToolDefinition::new(
                    *tool,
                    format!("{tool} tool"),
                    json!({"type": "object", "properties": {"value": {"type": "number"}}}),
                )
            })
            .collect();
        self.with_definitions(name, definitions)
    }

    pub fn with_definitions(mut self, name: &str, definitions: Vec<ToolDefinition>) -> Self {
        self.servers.push((name.to_string(), definitions));
        self.health.insert(name.to_string(), HealthStatus::Ok);
        self
    }

    pub fn with_health(mut self, name: &str, status: HealthStatus) -> Self {
        self.health.insert(name.to_string(), status);
        self
    }

    /// Make every health request fail with `error` until cleared.
    pub fn fail_health(&self, error: Option<McpdError>) {
        *self.health_error.lock() = error;
    }

    /// Number of logged requests starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn calls(&self) -> Vec<(String, String, Map<String, Value>)> {
        self.calls.lock().clone()
    }

    fn log(&self, request: String) {
        self.requests.lock().push(request);
    }

    fn not_found(server: &str) -> McpdError {
        McpdError::ServerNotFound {
            server: server.to_string(),
            source: None,
        }
    }
}

impl Daemon for FakeDaemon {
    fn list_servers(&self) -> Result<Vec<String>> {
        self.log("servers".to_string());
        Ok(self.servers.iter().map(|(name, _)| name.clone()).collect())
    }

    fn list_tools(&self, server: &str) -> Result<Vec<ToolDefinition>> {
        self.log(format!("tools:{server}"));
        self.servers
            .iter()
            .find(|(name, _)| name == server)
            .map(|(_, tools)| tools.clone())
            .ok_or_else(|| Self::not_found(server))
    }

    fn call_tool(&self, server: &str, tool: &str, params: &Map<String, Value>) -> Result<Value> {
        self.log(format!("call:{server}.{tool}"));
        self.calls
            .lock()
            .push((server.to_string(), tool.to_string(), params.clone()));
        Ok(json!({"server": server, "tool": tool, "params": params}))
    }

    fn server_health(&self, server: &str) -> Result<ServerHealth> {
        self.log(format!("health:{server}"));
        if let Some(error) = self.health_error.lock().clone() {
            return Err(error);
        }
        self.health
            .get(server)
            .map(|status| ServerHealth::new(server, *status))
            .ok_or_else(|| Self::not_found(server))
    }

    fn all_server_health(&self) -> Result<Vec<ServerHealth>> {
        self.log("all-health".to_string());
        if let Some(error) = self.health_error.lock().clone() {
            return Err(error);
        }
        Ok(self
            .servers
            .iter()
            .filter_map(|(name, _)| {
                self.health
                    .get(name)
                    .map(|status| ServerHealth::new(name.as_str(), *status))
            })
            .collect())
    }
}
