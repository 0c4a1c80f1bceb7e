//! Access to the mcpd daemon.
//!
//! The client only talks to the daemon through [`Daemon`], so tests and
//! embedders can swap the HTTP implementation for their own.

mod http;

use serde_json::{Map, Value};

use super::error::Result;
use super::types::{ServerHealth, ToolDefinition};

pub use http::{CALL_TIMEOUT, HttpDaemon, REQUEST_TIMEOUT};

/// Operations the mcpd daemon exposes.
pub trait Daemon: Send + Sync {
    /// Names of all servers behind the daemon.
    fn list_servers(&self) -> Result<Vec<String>>;

    /// Tool definitions advertised by one server.
    fn list_tools(&self, server: &str) -> Result<Vec<ToolDefinition>>;

    /// Run a tool and return its JSON result.
    fn call_tool(&self, server: &str, tool: &str, params: &Map<String, Value>) -> Result<Value>;

    /// Health of one server.
    fn server_health(&self, server: &str) -> Result<ServerHealth>;

    /// Health of every server, in one request.
    fn all_server_health(&self) -> Result<Vec<ServerHealth>>;
}
