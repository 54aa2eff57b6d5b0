//! REST admin API client for servers exposing the basic-auth /v1/api endpoints

use log::debug;
use reqwest::StatusCode;
use serde_json::Value;
use shared::{ProbeResult, RestCredentials, DEFAULT_MAX_PLAYERS};
use std::time::Duration;

/// Queries the HTTP admin API for server capacity and the live player list.
///
/// Anonymous probing is not supported: missing credentials or an empty
/// password are `Unavailable` without a request. Any non-200 status on
/// either endpoint, and any transport or decode failure, is `Unavailable`.
pub async fn query(
    host: &str,
    port: u16,
    credentials: Option<&RestCredentials>,
    wait: Duration,
) -> ProbeResult {
    let credentials = match credentials {
        Some(credentials) if !credentials.password.is_empty() => credentials,
        _ => return ProbeResult::Unavailable,
    };

    match exchange(host, port, credentials, wait).await {
        Ok(result) => result,
        Err(e) => {
            debug!("REST query to {}:{} failed: {}", host, port, e);
            ProbeResult::Unavailable
        }
    }
}

async fn exchange(
    host: &str,
    port: u16,
    credentials: &RestCredentials,
    wait: Duration,
) -> Result<ProbeResult, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(wait).build()?;
    let base = format!("http://{}:{}/v1/api", host, port);

    // Server info first, for the capacity figure
    let response = client
        .get(format!("{}/info", base))
        .basic_auth(&credentials.username, Some(&credentials.password))
        .send()
        .await?;
    if response.status() != StatusCode::OK {
        return Ok(ProbeResult::Unavailable);
    }
    let info: Value = response.json().await?;
    let max_players = max_players(&info);

    let response = client
        .get(format!("{}/players", base))
        .basic_auth(&credentials.username, Some(&credentials.password))
        .send()
        .await?;
    if response.status() != StatusCode::OK {
        return Ok(ProbeResult::Unavailable);
    }
    let players: Value = response.json().await?;

    Ok(ProbeResult::online(count_players(&players), max_players))
}

/// Capacity from the `/info` body, defaulting when absent or non-numeric.
fn max_players(info: &Value) -> u32 {
    info.get("serverPlayerMaxNum")
        .and_then(Value::as_u64)
        .unwrap_or(DEFAULT_MAX_PLAYERS as u64) as u32
}

/// Player count from the `/players` body, which is either a bare list or an
/// object wrapping one under a `players` key.
fn count_players(value: &Value) -> u32 {
    match value {
        Value::Array(entries) => entries.len() as u32,
        Value::Object(map) => map
            .get("players")
            .and_then(Value::as_array)
            .map(|players| players.len() as u32)
            .unwrap_or(0),
        _ => 0,
    }
}
