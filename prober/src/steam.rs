//! Source-engine style A2S_INFO query client for UDP game servers

use log::debug;
use shared::ProbeResult;
use std::io;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// Fixed A2S_INFO request: 0xFFFFFFFF header, 'T' type byte, query string
pub const INFO_REQUEST: &[u8] = b"\xFF\xFF\xFF\xFFTSource Engine Query\x00";

/// Type byte identifying an A2S_INFO response
const INFO_RESPONSE: u8 = 0x49;

/// Payload starts after the 4-byte header, the type byte and the protocol byte
const PAYLOAD_OFFSET: usize = 6;

/// Queries a game server for its player count over UDP.
///
/// Sends the fixed query datagram and waits for a single response within the
/// timeout. Every transport failure is absorbed into `Unavailable`; there are
/// no retries at this layer.
pub async fn query(host: &str, port: u16, wait: Duration) -> ProbeResult {
    match exchange(host, port, wait).await {
        Ok(data) => parse_info_response(&data),
        Err(e) => {
            debug!("A2S query to {}:{} failed: {}", host, port, e);
            ProbeResult::Unavailable
        }
    }
}

async fn exchange(host: &str, port: u16, wait: Duration) -> io::Result<Vec<u8>> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect((host, port)).await?;
    socket.send(INFO_REQUEST).await?;

    let mut buffer = [0u8; 1024];
    let len = timeout(wait, socket.recv(&mut buffer))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no response within timeout"))??;

    Ok(buffer[..len].to_vec())
}

/// Extracts `(players, max_players)` from an A2S_INFO response.
///
/// The payload is four null-terminated strings (server name, map, folder,
/// game), a 2-byte app id, then one byte each for current and max players.
/// A response with the wrong type byte, or one that runs out of bytes while
/// skipping that structure, is `Unavailable`.
pub fn parse_info_response(data: &[u8]) -> ProbeResult {
    if data.len() <= PAYLOAD_OFFSET || data[4] != INFO_RESPONSE {
        return ProbeResult::Unavailable;
    }

    let mut offset = PAYLOAD_OFFSET;
    for _ in 0..4 {
        match skip_string(data, offset) {
            Some(next) => offset = next,
            None => return ProbeResult::Unavailable,
        }
    }

    // App id plus both player-count bytes must still be present
    if offset + 4 > data.len() {
        return ProbeResult::Unavailable;
    }

    ProbeResult::Online {
        players: data[offset + 2] as u32,
        max_players: data[offset + 3] as u32,
    }
}

/// Returns the offset just past the next null terminator, if one exists.
fn skip_string(data: &[u8], offset: usize) -> Option<usize> {
    data[offset..]
        .iter()
        .position(|&b| b == 0)
        .map(|i| offset + i + 1)
}
