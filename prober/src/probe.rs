//! Probe dispatch and fallback across the per-game query protocols

use crate::{process, rcon, rest, steam};
use log::debug;
use shared::{
    ProbeResult, Protocol, ServerDefinition, ServerRegistry, ServerStatus, DEFAULT_PROBE_TIMEOUT,
};
use std::time::Duration;

/// Resolves server definitions to protocol clients and runs probes.
///
/// The registry is injected at construction and read-only afterwards; each
/// probe opens and closes its own connection, so concurrent probes share no
/// state beyond this struct's immutable fields.
pub struct Prober {
    registry: ServerRegistry,
    timeout: Duration,
}

impl Prober {
    pub fn new(registry: ServerRegistry) -> Self {
        Self::with_timeout(registry, DEFAULT_PROBE_TIMEOUT)
    }

    pub fn with_timeout(registry: ServerRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &ServerRegistry {
        &self.registry
    }

    /// Probes one server definition.
    ///
    /// Runs the primary protocol client; when it reports `Unavailable` and
    /// the definition declares a fallback protocol, that client is invoked
    /// exactly once with its own endpoint parameters. One hop, no retries.
    pub async fn probe(&self, definition: &ServerDefinition) -> ProbeResult {
        let result = self.probe_protocol(definition.protocol, definition).await;
        if !result.is_unavailable() {
            return result;
        }

        match definition.fallback {
            Some(fallback) => {
                debug!(
                    "{}: {:?} probe unavailable, trying {:?} fallback",
                    definition.name, definition.protocol, fallback
                );
                self.probe_protocol(fallback, definition).await
            }
            None => result,
        }
    }

    async fn probe_protocol(
        &self,
        protocol: Protocol,
        definition: &ServerDefinition,
    ) -> ProbeResult {
        let host = definition.host.as_str();
        match protocol {
            Protocol::Steam => steam::query(host, definition.port, self.timeout).await,
            // The ARK query port conventionally sits one above the game port
            Protocol::Ark => steam::query(host, definition.port + 1, self.timeout).await,
            Protocol::Rcon => {
                let password = definition.rcon_password.as_deref().unwrap_or("");
                rcon::query(host, definition.rcon_port(), password, self.timeout).await
            }
            Protocol::Rest => {
                rest::query(
                    host,
                    definition.rest_port(),
                    definition.rest_credentials.as_ref(),
                    self.timeout,
                )
                .await
            }
        }
    }

    /// Full status of a registered server, or `None` for an unknown name.
    ///
    /// The process presence check runs first; when the server's process is
    /// not alive the probe is skipped entirely.
    pub async fn status(&self, name: &str) -> Option<ServerStatus> {
        let definition = self.registry.get(name)?;
        Some(self.status_of(definition).await)
    }

    pub async fn status_of(&self, definition: &ServerDefinition) -> ServerStatus {
        if !process::is_process_running(&definition.process) {
            debug!("{}: process {} not running", definition.name, definition.process);
            return ServerStatus::NotRunning;
        }
        ServerStatus::Running(self.probe(definition).await)
    }

    /// Statuses of every registered server, in name order.
    pub async fn status_all(&self) -> Vec<(String, ServerStatus)> {
        let mut statuses = Vec::new();
        for name in self.registry.names() {
            if let Some(definition) = self.registry.get(name) {
                statuses.push((name.to_string(), self.status_of(definition).await));
            }
        }
        statuses
    }
}
