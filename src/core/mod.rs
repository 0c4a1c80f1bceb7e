//! Core SDK: transport, tool functions, health caching and tool resolution.

mod client;
mod dynamic;
mod error;
pub mod function;
pub mod health;
pub mod keychain;
mod resolve;
pub mod schema;
pub mod secret;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{McpdClient, normalize_endpoint};
pub use dynamic::{DynamicCaller, ServerProxy, ToolCall};
pub use error::{Cause, McpdError, Result};
pub use function::{FunctionBuilder, QUALIFIER, ToolFunction, qualified_name};
pub use health::{CacheTtl, HealthCache};
pub use resolve::ToolFilter;
pub use schema::{ParamType, ParameterSpec};
pub use transport::{Daemon, HttpDaemon};
pub use types::{HealthStatus, ServerHealth, ToolDefinition};
