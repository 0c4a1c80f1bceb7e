//! Wire types exchanged with the mcpd daemon.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Tool definition advertised by an MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    #[serde(default)]
    pub description: Option<String>,
    /// JSON Schema for input parameters
    #[serde(default = "empty_object")]
    pub input_schema: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl ToolDefinition {
    /// Create a definition from its parts.
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            input_schema,
        }
    }
}

/// Health status reported by the daemon for one server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Timeout,
    Unreachable,
    #[default]
    #[serde(other)]
    Unknown,
}

impl HealthStatus {
    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Timeout => "timeout",
            Self::Unreachable => "unreachable",
            Self::Unknown => "unknown",
        }
    }

    /// Whether `status` represents a healthy server.
    #[must_use]
    pub fn is_healthy(status: &str) -> bool {
        status == Self::Ok.as_str()
    }

    /// Whether `status` is a state the server may recover from on its own.
    #[must_use]
    pub fn is_transient(status: &str) -> bool {
        status == Self::Timeout.as_str() || status == Self::Unknown.as_str()
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Health snapshot for one server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerHealth {
    /// Server name
    pub name: String,
    /// Current status
    #[serde(default)]
    pub status: HealthStatus,
    /// Last measured ping latency in milliseconds
    #[serde(
        default,
        rename = "latency",
        deserialize_with = "deserialize_latency",
        skip_serializing_if = "Option::is_none"
    )]
    pub latency_ms: Option<f64>,
    /// When the daemon last pinged the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
    /// When the last successful ping happened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_successful: Option<DateTime<Utc>>,
}

impl ServerHealth {
    /// Create a record with only a name and status.
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            latency_ms: None,
            last_checked: None,
            last_successful: None,
        }
    }

    /// Whether this record reports an ok server.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

/// Latency arrives either as plain milliseconds or as a duration string.
///
/// A value that cannot be read is dropped rather than failing the record.
fn deserialize_latency<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(f64),
        Text(String),
        Other(Value),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Millis(ms)) => Some(ms),
        Some(Raw::Text(text)) => {
            let ms = parse_duration_ms(&text);
            if ms.is_none() {
                tracing::warn!(latency = %text, "ignoring unreadable latency");
            }
            ms
        }
        Some(Raw::Other(value)) => {
            tracing::warn!(latency = %value, "ignoring unreadable latency");
            None
        }
    })
}

/// Parse durations such as `"850µs"`, `"1.5ms"`, `"2s"` or `"1h2m3.5s"`
/// into milliseconds. A bare number is taken as milliseconds.
fn parse_duration_ms(text: &str) -> Option<f64> {
    let is_numeric = |c: char| c.is_ascii_digit() || c == '.';
    let mut rest = text.trim();
    if rest.is_empty() {
        return None;
    }
    if rest.chars().all(is_numeric) {
        return rest.parse().ok();
    }

    let mut total = 0.0;
    while !rest.is_empty() {
        let split = rest.find(|c: char| !is_numeric(c)).unwrap_or(rest.len());
        let (number, tail) = rest.split_at(split);
        let value: f64 = number.parse().ok()?;

        let split = tail.find(is_numeric).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(split);
        let factor = match unit {
            "ns" => 1e-6,
            "us" | "\u{b5}s" | "\u{3bc}s" => 1e-3,
            "ms" => 1.0,
            "s" => 1e3,
            "m" => 60e3,
            "h" => 3_600e3,
            _ => return None,
        };

        total += value * factor;
        rest = next;
    }

    Some(total)
}
