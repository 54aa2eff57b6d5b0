//! # Game Server Status Prober
//!
//! This library determines whether monitored game servers are up and how
//! many players they currently hold, using a different wire protocol per
//! game family.
//!
//! ## Core Responsibilities
//!
//! ### Protocol Clients
//! One client per query protocol, each fully absorbing its own transport
//! and protocol failures:
//! - [`steam`]: Source-engine A2S_INFO queries over UDP
//! - [`rcon`]: binary remote console over TCP with an auth handshake
//! - [`rest`]: basic-auth HTTP admin API
//!
//! Every client returns a [`shared::ProbeResult`]: either a concrete
//! `(players, max_players)` pair or `Unavailable`. No error type crosses
//! the client boundary.
//!
//! ### Probe Orchestration
//! [`probe::Prober`] resolves a server definition to its primary client,
//! runs the probe under a timeout, and applies at most one declared
//! fallback hop when the primary reports the server unavailable.
//!
//! ### Process Presence
//! [`process`] checks the host process table before any network probe, so
//! a server that is not running costs no network time at all.
//!
//! ## Concurrency Model
//!
//! Each probe runs to completion within a single call: it binds its own
//! socket or connection, bounds every network operation with an explicit
//! timeout, and releases the resource on every exit path. Concurrent
//! probes are fully independent.

pub mod probe;
pub mod process;
pub mod rcon;
pub mod rest;
pub mod steam;

pub use probe::Prober;
