//! mcpd-sdk - Client SDK for the mcpd daemon.
//!
//! Lists the MCP servers an mcpd daemon manages, turns their tool schemas
//! into callable [`ToolFunction`]s, and decides which tools to expose based
//! on server and tool names and on cached server health.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  ┌──────────────┐  ┌──────────────┐
//! │  ToolFilter │  │ DynamicCaller│  │     CLI      │
//! └──────┬──────┘  └──────┬───────┘  └──────┬───────┘
//!        └────────────────┼─────────────────┘
//!                  ┌──────┴──────┐
//!                  │ McpdClient  │── FunctionBuilder (per server+tool)
//!                  └──────┬──────┘── HealthCache (TTL, negative entries)
//!                  ┌──────┴──────┐
//!                  │   Daemon    │  HTTP /api/v1
//!                  └─────────────┘
//! ```
//!
//! ```no_run
//! use mcpd_sdk::{McpdClient, ToolFilter};
//!
//! let client = McpdClient::new("http://localhost:8090", None)?;
//! for function in client.agent_tools(&ToolFilter::new().servers(["time"]))? {
//!     println!("{}", function.signature());
//! }
//! # Ok::<(), mcpd_sdk::McpdError>(())
//! ```

pub mod build_info;
pub mod cli;
pub mod config;
pub mod core;

pub use config::Config;
pub use crate::core::{
    CacheTtl, Daemon, HealthStatus, HttpDaemon, McpdClient, McpdError, Result, ServerHealth,
    ToolDefinition, ToolFilter, ToolFunction,
};
