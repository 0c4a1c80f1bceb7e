//! HTTP implementation of [`Daemon`] for the mcpd `/api/v1` surface.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::Daemon;
use crate::build_info;
use crate::core::error::{McpdError, Result};
use crate::core::types::{ServerHealth, ToolDefinition};

/// Timeout for discovery, listing and health requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for tool invocations, which may do real work.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest response body kept in error messages.
const MAX_ERROR_BODY: usize = 512;

/// Non-success HTTP status returned by the daemon.
#[derive(Debug, thiserror::Error)]
#[error("HTTP {status}: {body}")]
pub struct HttpStatusError {
    pub status: u16,
    pub body: String,
}

/// A request the client makes, used to word errors.
#[derive(Debug, Clone, Copy)]
enum Operation<'a> {
    ListServers,
    ListTools(&'a str),
    CallTool(&'a str, &'a str),
    Health(&'a str),
    AllHealth,
}

impl Operation<'_> {
    const fn timeout(self) -> Duration {
        match self {
            Self::CallTool(..) => CALL_TIMEOUT,
            _ => REQUEST_TIMEOUT,
        }
    }

    fn name(self) -> String {
        match self {
            Self::ListServers => "list servers".to_string(),
            Self::ListTools(server) => format!("list tools for {server}"),
            Self::CallTool(server, tool) => format!("{server}.{tool}"),
            Self::Health(server) => format!("get health of {server}"),
            Self::AllHealth => "get health of all servers".to_string(),
        }
    }

    fn context(self) -> String {
        match self {
            Self::ListServers => "error listing servers".to_string(),
            Self::ListTools(server) => {
                format!("error listing tool definitions for server '{server}'")
            }
            Self::CallTool(server, tool) => {
                format!("error calling tool '{tool}' on server '{server}'")
            }
            Self::Health(server) => {
                format!("error retrieving health status for server '{server}'")
            }
            Self::AllHealth => "error retrieving health status for all servers".to_string(),
        }
    }

    /// Translate a non-success status into an SDK error.
    fn status_error(self, status: u16, body: String) -> McpdError {
        let cause = HttpStatusError { status, body };

        match (status, self) {
            (401, Self::CallTool(server, tool)) => McpdError::Authentication {
                message: format!("rejected when calling '{tool}' on '{server}'"),
                source: Some(Arc::new(cause)),
            },
            (401, Self::ListTools(server) | Self::Health(server)) => McpdError::Authentication {
                message: format!("rejected when accessing server '{server}'"),
                source: Some(Arc::new(cause)),
            },
            (401, _) => McpdError::Authentication {
                message: "request rejected by daemon".to_string(),
                source: Some(Arc::new(cause)),
            },
            (404, Self::ListServers) => McpdError::daemon(
                "servers API endpoint not found - ensure mcpd daemon is running and supports API version v1",
                cause,
            ),
            (404, Self::AllHealth) => McpdError::daemon(
                "health API endpoint not found - ensure mcpd daemon supports API version v1",
                cause,
            ),
            (
                404,
                Self::ListTools(server) | Self::Health(server) | Self::CallTool(server, _),
            ) => McpdError::ServerNotFound {
                server: server.to_string(),
                source: Some(Arc::new(cause)),
            },
            (500..=u16::MAX, Self::CallTool(server, tool)) => McpdError::ToolExecution {
                server: server.to_string(),
                tool: tool.to_string(),
                message: format!("server error when executing '{tool}' on '{server}'"),
                source: Some(Arc::new(cause)),
            },
            (_, Self::CallTool(server, tool)) => McpdError::ToolExecution {
                server: server.to_string(),
                tool: tool.to_string(),
                message: self.context(),
                source: Some(Arc::new(cause)),
            },
            (500..=u16::MAX, Self::ListServers) => McpdError::daemon("mcpd daemon server error", cause),
            _ => McpdError::daemon(self.context(), cause),
        }
    }
}

/// Blocking HTTP client for one mcpd daemon.
#[derive(Debug, Clone)]
pub struct HttpDaemon {
    endpoint: Url,
    http: Client,
}

impl HttpDaemon {
    /// Create a client for `endpoint`, attaching `api_key` as a bearer token.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint is not a valid base URL
    /// or the key cannot be used as a header value.
    pub fn new(endpoint: &str, api_key: Option<&str>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| McpdError::Config(format!("invalid endpoint '{endpoint}': {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(McpdError::Config(format!(
                "invalid endpoint '{endpoint}': not a base URL"
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| McpdError::Config("API key is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(build_info::user_agent())
            .build()
            .map_err(|e| McpdError::daemon("failed to build HTTP client", e))?;

        Ok(Self { endpoint, http })
    }

    /// Base URL of the daemon.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str().trim_end_matches('/')
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }

    fn send(&self, op: Operation<'_>, request: RequestBuilder) -> Result<Response> {
        let response = request
            .timeout(op.timeout())
            .send()
            .map_err(|e| self.transport_error(op, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut body = response.text().unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            body.truncate(cut);
        }

        tracing::debug!(operation = %op.name(), status = status.as_u16(), "daemon returned error");
        Err(op.status_error(status.as_u16(), body))
    }

    fn get_json<T: DeserializeOwned>(&self, op: Operation<'_>, segments: &[&str]) -> Result<T> {
        let url = self.url(segments);
        tracing::debug!(url = %url, "GET");

        self.send(op, self.http.get(url))?
            .json()
            .map_err(|e| self.transport_error(op, e))
    }

    fn transport_error(&self, op: Operation<'_>, err: reqwest::Error) -> McpdError {
        if err.is_timeout() {
            McpdError::Timeout {
                operation: op.name(),
                timeout_secs: op.timeout().as_secs(),
                source: Some(Arc::new(err)),
            }
        } else if err.is_connect() {
            McpdError::Connection {
                endpoint: self.endpoint().to_string(),
                source: Some(Arc::new(err)),
            }
        } else {
            McpdError::daemon(op.context(), err)
        }
    }
}

#[derive(Deserialize)]
struct ToolsResponse {
    #[serde(default)]
    tools: Vec<ToolDefinition>,
}

#[derive(Deserialize)]
struct HealthResponse {
    #[serde(default)]
    servers: Vec<ServerHealth>,
}

impl Daemon for HttpDaemon {
    fn list_servers(&self) -> Result<Vec<String>> {
        self.get_json(Operation::ListServers, &["servers"])
    }

    fn list_tools(&self, server: &str) -> Result<Vec<ToolDefinition>> {
        let response: ToolsResponse =
            self.get_json(Operation::ListTools(server), &["servers", server, "tools"])?;
        Ok(response.tools)
    }

    fn call_tool(&self, server: &str, tool: &str, params: &Map<String, Value>) -> Result<Value> {
        let op = Operation::CallTool(server, tool);
        let url = self.url(&["servers", server, "tools", tool]);
        tracing::debug!(url = %url, params = params.len(), "POST");

        self.send(op, self.http.post(url).json(params))?
            .json()
            .map_err(|e| self.transport_error(op, e))
    }

    fn server_health(&self, server: &str) -> Result<ServerHealth> {
        self.get_json(Operation::Health(server), &["health", "servers", server])
    }

    fn all_server_health(&self) -> Result<Vec<ServerHealth>> {
        let response: HealthResponse =
            self.get_json(Operation::AllHealth, &["health", "servers"])?;
        Ok(response.servers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_versioned_urls() {
        let daemon = HttpDaemon::new("http://localhost:8090", None).unwrap();
        assert_eq!(
            daemon.url(&["servers", "time", "tools"]).as_str(),
            "http://localhost:8090/api/v1/servers/time/tools"
        );

        let prefixed = HttpDaemon::new("https://gateway.example.com/mcpd/", None).unwrap();
        assert_eq!(
            prefixed.url(&["health", "servers"]).as_str(),
            "https://gateway.example.com/mcpd/api/v1/health/servers"
        );
    }

    #[test]
    fn url_segments_are_escaped() {
        let daemon = HttpDaemon::new("http://localhost:8090", None).unwrap();
        assert_eq!(
            daemon.url(&["servers", "my server", "tools"]).as_str(),
            "http://localhost:8090/api/v1/servers/my%20server/tools"
        );
    }

    #[test]
    fn rejects_invalid_endpoint() {
        assert!(matches!(
            HttpDaemon::new("not a url", None),
            Err(McpdError::Config(_))
        ));
    }

    #[test]
    fn unauthorized_maps_to_authentication() {
        let err = Operation::ListServers.status_error(401, String::new());
        assert!(matches!(err, McpdError::Authentication { .. }));

        let err = Operation::CallTool("time", "now").status_error(401, String::new());
        assert!(err.to_string().contains("'now' on 'time'"));
    }

    #[test]
    fn not_found_depends_on_operation() {
        let err = Operation::ListServers.status_error(404, String::new());
        assert!(matches!(err, McpdError::Daemon { .. }));

        for op in [
            Operation::ListTools("git"),
            Operation::Health("git"),
            Operation::CallTool("git", "log"),
        ] {
            match op.status_error(404, String::new()) {
                McpdError::ServerNotFound { server, .. } => assert_eq!(server, "git"),
                other => panic!("expected ServerNotFound, got {other:?}"),
            }
        }
    }

    #[test]
    fn tool_failures_carry_names() {
        let err = Operation::CallTool("math", "divide").status_error(500, "boom".to_string());
        match err {
            McpdError::ToolExecution {
                server,
                tool,
                message,
                source,
            } => {
                assert_eq!(server, "math");
                assert_eq!(tool, "divide");
                assert!(message.starts_with("server error"));
                assert_eq!(source.unwrap().to_string(), "HTTP 500: boom");
            }
            other => panic!("expected ToolExecution, got {other:?}"),
        }

        let err = Operation::CallTool("math", "divide").status_error(422, String::new());
        assert!(matches!(err, McpdError::ToolExecution { .. }));
    }

    #[test]
    fn other_listing_failures_are_generic() {
        let err = Operation::ListTools("git").status_error(503, String::new());
        match err {
            McpdError::Daemon { message, .. } => {
                assert_eq!(message, "error listing tool definitions for server 'git'");
            }
            other => panic!("expected Daemon, got {other:?}"),
        }
    }

    #[test]
    fn operation_timeouts() {
        assert_eq!(Operation::ListServers.timeout(), REQUEST_TIMEOUT);
        assert_eq!(Operation::CallTool("a", "b").timeout(), CALL_TIMEOUT);
        assert_eq!(Operation::CallTool("a", "b").name(), "a.b");
    }
}
