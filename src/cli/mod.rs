//! CLI command parsing.

pub mod auth;

use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};

/// mcpd-sdk - Discover and call MCP tools through an mcpd daemon.
#[derive(Parser)]
#[command(name = "mcpd-sdk")]
#[command(about = "Discover and call MCP tools through an mcpd daemon")]
#[command(version = crate::build_info::FULL_VERSION)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Daemon address (overrides config and MCPD_ADDR).
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// API key (overrides config, MCPD_API_KEY and the keychain).
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Increase logging verbosity.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List servers known to the daemon.
    Servers,

    /// List tools, for one server or all of them.
    Tools {
        /// Only this server.
        server: Option<String>,
    },

    /// Call a tool.
    Call {
        server: String,
        tool: String,

        /// Argument as `key=value`; the value is parsed as JSON when possible.
        #[arg(short = 'a', long = "arg", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        args: Vec<(String, Value)>,

        /// Arguments as a JSON object, merged under `--arg` values.
        #[arg(long, value_name = "OBJECT")]
        json: Option<String>,
    },

    /// Show server health.
    Health {
        /// Only this server.
        server: Option<String>,
    },

    /// Show the functions generated for exposed tools.
    #[command(visible_alias = "fns")]
    Functions(FunctionsArgs),

    /// Manage the stored API key.
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Manage configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Debug, Default)]
pub struct FunctionsArgs {
    /// Only tools from these servers.
    #[arg(short, long = "server")]
    pub servers: Vec<String>,

    /// Only tools with these bare or qualified names.
    #[arg(short, long = "tool")]
    pub tools: Vec<String>,

    /// Include servers regardless of health.
    #[arg(long)]
    pub no_health_check: bool,
}

impl FunctionsArgs {
    /// Translate flags into a resolution filter. Absent flags mean "all".
    #[must_use]
    pub fn filter(&self) -> crate::ToolFilter {
        let mut filter = crate::ToolFilter::new().check_health(!self.no_health_check);
        if !self.servers.is_empty() {
            filter = filter.servers(self.servers.iter().cloned());
        }
        if !self.tools.is_empty() {
            filter = filter.tools(self.tools.iter().cloned());
        }
        filter
    }
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store an API key for the configured endpoint in the system keychain.
    Login(LoginArgs),

    /// Remove the stored API key for the configured endpoint.
    Logout,
}

#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    /// Key to store; prompted for when omitted.
    #[arg(long = "key")]
    pub api_key: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration.
    Show,

    /// Show the configuration file path.
    Path,
}

/// Parse `key=value`, reading the value as JSON and falling back to a string.
fn parse_key_value(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Build the argument map for `call` from `--json` and `--arg` values.
///
/// # Errors
///
/// Returns an error if `--json` is not a JSON object.
pub fn call_arguments(json: Option<&str>, args: Vec<(String, Value)>) -> anyhow::Result<Map<String, Value>> {
    let mut map = match json {
        Some(raw) => match serde_json::from_str(raw)? {
            Value::Object(map) => map,
            other => anyhow::bail!("--json must be an object, got {other}"),
        },
        None => Map::new(),
    };
    map.extend(args);
    Ok(map)
}
