use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_PLAYERS: u32 = 32;
pub const DEFAULT_RCON_PORT: u16 = 25575;
pub const DEFAULT_REST_PORT: u16 = 8212;
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Wire protocol used to query a server for its player count.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Source-engine A2S_INFO query over UDP
    Steam,
    /// A2S_INFO against the conventional query port one above the game port
    Ark,
    /// Binary remote console over TCP
    Rcon,
    /// HTTP admin API with basic authentication
    Rest,
}

/// Outcome of a single probe attempt.
///
/// A protocol client either produces a concrete player count or reports the
/// server as unavailable. No error ever crosses this boundary.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    Online { players: u32, max_players: u32 },
    Unavailable,
}

impl ProbeResult {
    pub fn online(players: u32, max_players: u32) -> Self {
        ProbeResult::Online {
            players,
            max_players,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ProbeResult::Unavailable)
    }
}

/// Full status of a monitored server: the process presence gate combined
/// with the probe outcome when the process is alive.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    NotRunning,
    Running(ProbeResult),
}

/// Credentials for the basic-auth protected REST admin API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RestCredentials {
    pub username: String,
    pub password: String,
}

/// Static description of one monitored game server.
///
/// Definitions are immutable after load: the registry hands out references
/// and nothing mutates them during a probe.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerDefinition {
    /// Logical name used to address the server ("palworld", "enshrouded", ...)
    pub name: String,
    /// Executable name of the server process on the host
    pub process: String,
    /// Primary query protocol
    pub protocol: Protocol,
    #[serde(default = "default_host")]
    pub host: String,
    /// Game port; also the query port for `Protocol::Steam`
    pub port: u16,
    /// RCON port, when it differs from the default
    #[serde(default)]
    pub query_port: Option<u16>,
    /// REST admin API port, when it differs from the default
    #[serde(default)]
    pub rest_api_port: Option<u16>,
    #[serde(default)]
    pub rcon_password: Option<String>,
    #[serde(default)]
    pub rest_credentials: Option<RestCredentials>,
    /// Protocol to try once if the primary probe reports `Unavailable`
    #[serde(default)]
    pub fallback: Option<Protocol>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

impl ServerDefinition {
    /// Creates a definition with default host and no optional endpoints.
    pub fn new(name: &str, process: &str, protocol: Protocol, port: u16) -> Self {
        Self {
            name: name.to_string(),
            process: process.to_string(),
            protocol,
            host: default_host(),
            port,
            query_port: None,
            rest_api_port: None,
            rcon_password: None,
            rest_credentials: None,
            fallback: None,
        }
    }

    pub fn rcon_port(&self) -> u16 {
        self.query_port.unwrap_or(DEFAULT_RCON_PORT)
    }

    pub fn rest_port(&self) -> u16 {
        self.rest_api_port.unwrap_or(DEFAULT_REST_PORT)
    }
}

/// Registry of monitored servers, keyed by logical name.
///
/// Built once at startup from configuration and injected into the prober;
/// names are unique and lookups are read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ServerRegistry {
    servers: HashMap<String, ServerDefinition>,
}

impl ServerRegistry {
    pub fn new() -> Self {
        Self {
            servers: HashMap::new(),
        }
    }

    /// Adds a definition, refusing duplicates.
    ///
    /// Returns false and leaves the registry unchanged when a definition
    /// with the same logical name is already present.
    pub fn add(&mut self, definition: ServerDefinition) -> bool {
        if self.servers.contains_key(&definition.name) {
            return false;
        }
        self.servers.insert(definition.name.clone(), definition);
        true
    }

    pub fn get(&self, name: &str) -> Option<&ServerDefinition> {
        self.servers.get(name)
    }

    /// Registered names in sorted order, for stable listings.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.servers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServerDefinition> {
        self.servers.values()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
