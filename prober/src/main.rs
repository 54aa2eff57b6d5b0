use clap::Parser;
use log::info;
use prober::Prober;
use shared::{
    ProbeResult, Protocol, RestCredentials, ServerDefinition, ServerRegistry, ServerStatus,
};
use std::path::Path;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Logical name of a single server to check (all servers when omitted)
    server: Option<String>,

    /// Probe timeout in seconds
    #[arg(short, long, default_value = "5")]
    timeout: u64,

    /// JSON file with server definitions (built-in registry when omitted)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let registry = match &args.config {
        Some(path) => load_registry(path)?,
        None => default_registry()?,
    };

    let prober = Prober::with_timeout(registry, Duration::from_secs(args.timeout));

    match &args.server {
        Some(name) => {
            let name = name.to_lowercase();
            info!("Checking server '{}'", name);
            let status = prober.status(&name).await.ok_or_else(|| {
                format!(
                    "unknown server '{}', available servers: {}",
                    name,
                    prober.registry().names().join(", ")
                )
            })?;
            println!("{}", format_status(&name, &status));
        }
        None => {
            info!("Checking {} registered server(s)", prober.registry().len());
            let statuses = prober.status_all().await;
            let running: Vec<String> = statuses
                .iter()
                .filter(|(_, status)| *status != ServerStatus::NotRunning)
                .map(|(name, status)| format_status(name, status))
                .collect();

            if running.is_empty() {
                println!("No monitored servers are currently running.");
            } else {
                println!("The following server(s) are running:");
                for line in running {
                    println!("{}", line);
                }
            }
        }
    }

    Ok(())
}

fn format_status(name: &str, status: &ServerStatus) -> String {
    match status {
        ServerStatus::NotRunning => format!("{} is not currently running", name),
        ServerStatus::Running(ProbeResult::Online {
            players,
            max_players,
        }) => format!("{} ({}/{} players)", name, players, max_players),
        ServerStatus::Running(ProbeResult::Unavailable) => {
            format!("{} (player count unavailable)", name)
        }
    }
}

fn load_registry(path: &Path) -> Result<ServerRegistry, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let definitions: Vec<ServerDefinition> = serde_json::from_str(&raw)?;
    build_registry(definitions)
}

fn build_registry(
    definitions: Vec<ServerDefinition>,
) -> Result<ServerRegistry, Box<dyn std::error::Error>> {
    let mut registry = ServerRegistry::new();
    for definition in definitions {
        let name = definition.name.clone();
        if !registry.add(definition) {
            return Err(format!("duplicate server definition '{}'", name).into());
        }
    }
    Ok(registry)
}

/// Built-in definitions for the servers this tool monitors by default.
/// RCON and REST credentials come from the environment; without them the
/// respective probes report the player count as unavailable.
fn default_registry() -> Result<ServerRegistry, Box<dyn std::error::Error>> {
    let rcon_password = std::env::var("PALWORLD_RCON_PASSWORD").ok();
    let rest_username =
        std::env::var("PALWORLD_REST_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let rest_credentials = std::env::var("PALWORLD_REST_PASSWORD")
        .ok()
        .map(|password| RestCredentials {
            username: rest_username,
            password,
        });

    let ark = ServerDefinition::new("ark", "ArkAscendedServer.exe", Protocol::Ark, 7777);

    let mut palworld = ServerDefinition::new(
        "palworld",
        "PalServer-Win64-Shipping-Cmd.exe",
        Protocol::Rest,
        8211,
    );
    palworld.query_port = Some(25575);
    palworld.rest_api_port = Some(8212);
    palworld.rcon_password = rcon_password;
    palworld.rest_credentials = rest_credentials;
    palworld.fallback = Some(Protocol::Rcon);

    let enshrouded = ServerDefinition::new("enshrouded", "enshrouded.exe", Protocol::Steam, 15636);

    build_registry(vec![ark, palworld, enshrouded])
}
