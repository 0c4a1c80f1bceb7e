//! Fluent `server → tool → call` access.

use serde_json::{Map, Value};

use super::client::McpdClient;
use super::error::{McpdError, Result};

/// Entry point returned by [`McpdClient::call`].
#[derive(Debug, Clone, Copy)]
pub struct DynamicCaller<'a> {
    client: &'a McpdClient,
}

impl<'a> DynamicCaller<'a> {
    pub(crate) const fn new(client: &'a McpdClient) -> Self {
        Self { client }
    }

    /// Select a server. Nothing is checked until a tool is requested.
    #[must_use]
    pub fn server(self, name: impl Into<String>) -> ServerProxy<'a> {
        ServerProxy {
            client: self.client,
            server: name.into(),
        }
    }
}

/// A server selected through [`DynamicCaller::server`].
#[derive(Debug, Clone)]
pub struct ServerProxy<'a> {
    client: &'a McpdClient,
    server: String,
}

impl<'a> ServerProxy<'a> {
    /// Name of the selected server.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.server
    }

    /// Select a tool on this server.
    ///
    /// # Errors
    ///
    /// Returns [`McpdError::ToolNotFound`] if the server does not list the
    /// tool, including when the server itself cannot be queried.
    pub fn tool(&self, name: &str) -> Result<ToolCall<'a>> {
        if !self.client.has_tool(&self.server, name) {
            return Err(McpdError::ToolNotFound {
                server: self.server.clone(),
                tool: name.to_string(),
            });
        }
        Ok(ToolCall {
            client: self.client,
            server: self.server.clone(),
            tool: name.to_string(),
        })
    }
}

/// A tool ready to be called.
#[derive(Debug, Clone)]
pub struct ToolCall<'a> {
    client: &'a McpdClient,
    server: String,
    tool: String,
}

impl ToolCall<'_> {
    /// Run the tool with `args` as its parameters.
    ///
    /// Arguments are forwarded as given; the daemon does the validation.
    pub fn call(&self, args: Map<String, Value>) -> Result<Value> {
        self.client.perform_call(&self.server, &self.tool, &args)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::core::health::CacheTtl;
    use crate::core::testing::FakeDaemon;

    #[test]
    fn calls_listed_tool() {
        let daemon = Arc::new(FakeDaemon::new().with_server("time", &["get_current_time"]));
        let client = McpdClient::with_daemon(daemon.clone(), CacheTtl::default());

        let args = json!({"timezone": "UTC"}).as_object().cloned().unwrap();
        let result = client
            .call()
            .server("time")
            .tool("get_current_time")
            .unwrap()
            .call(args)
            .unwrap();

        assert_eq!(result["tool"], "get_current_time");
        assert_eq!(daemon.count("call:time.get_current_time"), 1);
    }

    #[test]
    fn unknown_tool_is_not_found() {
        let daemon = Arc::new(FakeDaemon::new().with_server("time", &["get_current_time"]));
        let client = McpdClient::with_daemon(daemon.clone(), CacheTtl::default());

        let err = client.call().server("time").tool("nope").unwrap_err();
        assert!(matches!(
            err,
            McpdError::ToolNotFound { ref server, ref tool } if server == "time" && tool == "nope"
        ));
        assert_eq!(daemon.count("call:"), 0);
    }

    #[test]
    fn unknown_server_is_tool_not_found() {
        let daemon = Arc::new(FakeDaemon::new());
        let client = McpdClient::with_daemon(daemon, CacheTtl::default());

        let proxy = client.call().server("ghost");
        assert_eq!(proxy.name(), "ghost");
        assert!(matches!(proxy.tool("x"), Err(McpdError::ToolNotFound { .. })));
    }

    #[test]
    fn arguments_are_not_validated_locally() {
        let daemon = Arc::new(FakeDaemon::new().with_server("math", &["add"]));
        let client = McpdClient::with_daemon(daemon.clone(), CacheTtl::default());

        let args = json!({"anything": true}).as_object().cloned().unwrap();
        client.call().server("math").tool("add").unwrap().call(args.clone()).unwrap();

        assert_eq!(daemon.calls()[0].2, args);
    }
}
