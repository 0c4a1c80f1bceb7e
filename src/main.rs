use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mcpd_sdk::{
    Config, McpdClient,
    cli::{AuthCommands, Cli, Commands, ConfigCommands, auth, call_arguments},
    core::secret::mask_secrets,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", mask_secrets(&format!("{e:#}")));
            ExitCode::FAILURE
        }
    }
}

/// Effective configuration: file and environment, then CLI flags.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint.clone_from(endpoint);
    }
    if let Some(key) = &cli.api_key {
        config.api_key = Some(key.clone());
    }
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    let client = || -> anyhow::Result<McpdClient> {
        Ok(McpdClient::from_config(&config.clone().with_keychain_key())?)
    };

    match cli.command {
        Commands::Servers => {
            for server in client()?.servers()? {
                println!("{server}");
            }
        }

        Commands::Tools { server } => {
            let client = client()?;
            let listing = match server {
                Some(server) => {
                    let tools = client.tools(&server)?;
                    vec![(server, tools)]
                }
                None => client.all_tools()?,
            };
            for (server, tools) in listing {
                println!("{server}:");
                for tool in tools {
                    match tool.description.as_deref() {
                        Some(description) => println!("  {:<30} {description}", tool.name),
                        None => println!("  {}", tool.name),
                    }
                }
            }
        }

        Commands::Call {
            server,
            tool,
            args,
            json,
        } => {
            let client = client()?;
            let args = call_arguments(json.as_deref(), args)?;
            let result = client.call().server(server).tool(&tool)?.call(args)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Health { server } => {
            let client = client()?;
            let records: Vec<_> = match server {
                Some(server) => vec![client.server_health(&server)?],
                None => client.all_server_health()?.into_values().collect(),
            };
            println!("{:<24} {:<12} {:>10}  Last checked", "Server", "Status", "Latency");
            println!("{}", "-".repeat(72));
            for record in records {
                let latency = record
                    .latency_ms
                    .map_or_else(|| "-".to_string(), |ms| format!("{ms:.1}ms"));
                let checked = record.last_checked.map_or_else(
                    || "never".to_string(),
                    |at| at.format("%Y-%m-%d %H:%M:%S").to_string(),
                );
                println!(
                    "{:<24} {:<12} {latency:>10}  {checked}",
                    record.name, record.status
                );
            }
        }

        Commands::Functions(args) => {
            let client = client()?;
            for function in client.agent_tools(&args.filter())? {
                println!("{}", function.signature());
                for line in function.doc().lines() {
                    println!("    {line}");
                }
                println!();
            }
        }

        Commands::Auth { command } => match command {
            AuthCommands::Login(args) => auth::auth_login(&config.endpoint, args)?,
            AuthCommands::Logout => auth::auth_logout(&config.endpoint)?,
        },

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                println!("{}", config.to_masked_toml()?);
            }
            ConfigCommands::Path => {
                let path = Config::config_path()?;
                println!("{}", path.display());
            }
        },
    }

    Ok(())
}
