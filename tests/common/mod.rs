//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use serde_json::{Map, Value, json};

use mcpd_sdk::{Daemon, HealthStatus, McpdError, Result, ServerHealth, ToolDefinition};

/// In-memory daemon that counts requests by kind.
#[derive(Default)]
pub struct CountingDaemon {
    servers: Vec<(String, Vec<ToolDefinition>)>,
    health: Mutex<HashMap<String, HealthStatus>>,
    requests: Mutex<Vec<String>>,
}

impl CountingDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(mut self, name: &str, tools: &[&str]) -> Self {
        let tools = tools
            .iter()
            .map(|tool| {
                ToolDefinition::new(
                    *tool,
                    format!("{tool} numbers"),
                    json!({
                        "type": "object",
                        "properties": {
                            "a": {"type": "number", "description": "first operand"},
                            "b": {"type": "number", "description": "second operand"}
                        },
                        "required": ["a", "b"]
                    }),
                )
            })
            .collect();
        self.servers.push((name.to_string(), tools));
        self.health.lock().insert(name.to_string(), HealthStatus::Ok);
        self
    }

    /// Change a server's reported status; takes effect on the next live lookup.
    pub fn set_health(&self, name: &str, status: HealthStatus) {
        self.health.lock().insert(name.to_string(), status);
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    pub fn total(&self) -> usize {
        self.requests.lock().len()
    }

    fn log(&self, entry: String) {
        self.requests.lock().push(entry);
    }

    fn missing(server: &str) -> McpdError {
        McpdError::ServerNotFound {
            server: server.to_string(),
            source: None,
        }
    }
}

impl Daemon for CountingDaemon {
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
            .ok_or_else(|| Self::missing(server))
    }

    fn call_tool(&self, server: &str, tool: &str, params: &Map<String, Value>) -> Result<Value> {
        self.log(format!("call:{server}.{tool}"));
        let sum: f64 = params.values().filter_map(Value::as_f64).sum();
        Ok(json!({"server": server, "tool": tool, "result": sum}))
    }

    fn server_health(&self, server: &str) -> Result<ServerHealth> {
        self.log(format!("health:{server}"));
        self.health
            .lock()
            .get(server)
            .map(|status| ServerHealth::new(server, *status))
            .ok_or_else(|| Self::missing(server))
    }

    fn all_server_health(&self) -> Result<Vec<ServerHealth>> {
        self.log("all-health".to_string());
        let health = self.health.lock();
        Ok(self
            .servers
            .iter()
            .filter_map(|(name, _)| health.get(name).map(|s| ServerHealth::new(name.as_str(), *s)))
            .collect())
    }
}

/// One request received by [`StubServer`].
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Loopback HTTP server answering each request from a closure.
pub struct StubServer {
    pub endpoint: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    pub fn start<F>(respond: F) -> Self
    where
        F: Fn(&str, &str) -> (u16, String) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let Some(request) = read_request(&stream) else {
                    continue;
                };
                let (status, body) = respond(&request.method, &request.path);
                log.lock().push(request);
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self { endpoint, requests }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }
}

fn read_request(stream: &TcpStream) -> Option<Recorded> {
    let mut reader = BufReader::new(stream);

    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = HashMap::new();
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let length = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).ok()?;

    Some(Recorded {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
