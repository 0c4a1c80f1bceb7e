//! Error types for the SDK.

use std::sync::Arc;

/// Underlying cause of an error, shared so errors stay cheap to clone.
pub type Cause = Arc<dyn std::error::Error + Send + Sync>;

/// SDK error type.
///
/// Every transport or HTTP failure is translated into one of these kinds
/// before it leaves the client. The original failure stays reachable via
/// [`std::error::Error::source`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum McpdError {
    /// The daemon could not be reached.
    #[error("cannot connect to mcpd daemon at {endpoint}")]
    Connection {
        endpoint: String,
        #[source]
        source: Option<Cause>,
    },

    /// A request exceeded its fixed timeout.
    #[error("{operation} timed out after {timeout_secs} seconds")]
    Timeout {
        operation: String,
        timeout_secs: u64,
        #[source]
        source: Option<Cause>,
    },

    /// The daemon rejected the credential (HTTP 401).
    #[error("authentication failed: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// The named server does not exist (HTTP 404).
    #[error("server '{server}' not found")]
    ServerNotFound {
        server: String,
        #[source]
        source: Option<Cause>,
    },

    /// A health check found the server in a non-ok state.
    #[error("server '{server}' is not healthy (status: {status})")]
    ServerUnhealthy { server: String, status: String },

    /// The daemon reported a failure while running a tool.
    #[error("{message}")]
    ToolExecution {
        server: String,
        tool: String,
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// Arguments passed to a generated tool function were rejected.
    #[error("{}", validation_message(.tool, .missing, .unexpected))]
    Validation {
        tool: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// The dynamic caller was asked for a tool the server does not expose.
    #[error("tool '{tool}' not found on server '{server}'")]
    ToolNotFound { server: String, tool: String },

    /// Any other daemon failure, with context.
    #[error("{message}")]
    Daemon {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

fn validation_message(tool: &str, missing: &[String], unexpected: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing required parameters: {}", missing.join(", ")));
    }
    if !unexpected.is_empty() {
        parts.push(format!("unexpected parameters: {}", unexpected.join(", ")));
    }
    format!("invalid arguments for '{tool}': {}", parts.join("; "))
}

impl McpdError {
    /// Wrap an arbitrary failure as a generic daemon error.
    pub fn daemon(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Daemon {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Add context to an error while keeping the original as its source.
    #[must_use]
    pub fn context(self, message: impl Into<String>) -> Self {
        Self::Daemon {
            message: message.into(),
            source: Some(Arc::new(self)),
        }
    }

    /// Whether the health cache may remember this failure and replay it.
    #[must_use]
    pub const fn is_cacheable(&self) -> bool {
        matches!(
            self,
            Self::ServerNotFound { .. } | Self::ServerUnhealthy { .. } | Self::Authentication { .. }
        )
    }
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, McpdError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn cacheable_kinds() {
        let not_found = McpdError::ServerNotFound {
            server: "time".to_string(),
            source: None,
        };
        let unhealthy = McpdError::ServerUnhealthy {
            server: "time".to_string(),
            status: "timeout".to_string(),
        };
        let auth = McpdError::Authentication {
            message: "bad key".to_string(),
            source: None,
        };
        assert!(not_found.is_cacheable());
        assert!(unhealthy.is_cacheable());
        assert!(auth.is_cacheable());

        let connection = McpdError::Connection {
            endpoint: "http://localhost:8090".to_string(),
            source: None,
        };
        let timeout = McpdError::Timeout {
            operation: "list servers".to_string(),
            timeout_secs: 5,
            source: None,
        };
        assert!(!connection.is_cacheable());
        assert!(!timeout.is_cacheable());
        assert!(!McpdError::Config("x".to_string()).is_cacheable());
    }

    #[test]
    fn validation_lists_every_missing_name() {
        let err = McpdError::Validation {
            tool: "math__add".to_string(),
            missing: vec!["a".to_string(), "b".to_string()],
            unexpected: Vec::new(),
        };
        assert_eq!(
            err.to_string(),
            "invalid arguments for 'math__add': missing required parameters: a, b"
        );
    }

    #[test]
    fn context_keeps_cause() {
        let err = McpdError::ServerNotFound {
            server: "git".to_string(),
            source: None,
        }
        .context("could not retrieve all tool definitions");

        assert_eq!(err.to_string(), "could not retrieve all tool definitions");
        let cause = err.source().expect("cause should be chained");
        assert_eq!(cause.to_string(), "server 'git' not found");
    }

    #[test]
    fn timeout_message_names_operation() {
        let err = McpdError::Timeout {
            operation: "time.get_current_time".to_string(),
            timeout_secs: 30,
            source: None,
        };
        assert_eq!(
            err.to_string(),
            "time.get_current_time timed out after 30 seconds"
        );
    }
}
