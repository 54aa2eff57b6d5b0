//! Binary RCON client used to pull a player count out of `ShowPlayers` output

use log::debug;
use regex::Regex;
use shared::{ProbeResult, DEFAULT_MAX_PLAYERS};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Fixed request id for the authentication exchange; the command that
/// follows uses the next id.
const AUTH_REQUEST_ID: i32 = 12345;

/// SERVERDATA_AUTH
const TYPE_AUTH: i32 = 3;
/// SERVERDATA_EXECCOMMAND
const TYPE_EXEC: i32 = 2;

/// Smallest well-formed frame: length prefix, request id and packet type
const HEADER_LEN: usize = 12;

const PLAYER_LIST_COMMAND: &str = "ShowPlayers";

/// Lowercased substrings marking a line that describes a connected player
const PLAYER_LINE_KEYWORDS: [&str; 4] = ["name:", "player", "uid:", "steamid:"];

/// Line prefixes that carry server chatter rather than player entries
const EXCLUDED_PREFIXES: [&str; 3] = ["welcome", "server", "version"];

/// Fallback patterns applied when no keyword line matched
const PLAYER_PATTERNS: [&str; 4] = [
    r"(?i)name:\s*([^\s,]+)",
    r"(?i)player[^\s]*:\s*([^\s,]+)",
    r"(?i)([^\s]+)\s*,\s*uid:",
    r"(?i)([^\s]+)\s*,\s*steamid:",
];

/// Authenticates against a server's remote console and derives a player
/// count from the `ShowPlayers` listing.
///
/// Unauthenticated RCON is not supported: an empty password is `Unavailable`
/// without a connection attempt. Refused connections, timeouts and failed
/// handshakes are `Unavailable` too, but once the command exchange succeeds
/// an unparseable reply counts as zero players rather than as a down server.
pub async fn query(host: &str, port: u16, password: &str, wait: Duration) -> ProbeResult {
    if password.is_empty() {
        return ProbeResult::Unavailable;
    }

    match exchange(host, port, password, wait).await {
        Ok(result) => result,
        Err(e) => {
            debug!("RCON query to {}:{} failed: {}", host, port, e);
            ProbeResult::Unavailable
        }
    }
}

async fn exchange(
    host: &str,
    port: u16,
    password: &str,
    wait: Duration,
) -> io::Result<ProbeResult> {
    let mut stream = timeout(wait, TcpStream::connect((host, port)))
        .await
        .map_err(timed_out)??;

    // Authentication handshake under the fixed request id
    let auth = encode_packet(AUTH_REQUEST_ID, TYPE_AUTH, password);
    timeout(wait, stream.write_all(&auth))
        .await
        .map_err(timed_out)??;

    let mut buffer = [0u8; 1024];
    let len = timeout(wait, stream.read(&mut buffer))
        .await
        .map_err(timed_out)??;
    if len < HEADER_LEN {
        return Ok(ProbeResult::Unavailable);
    }

    let auth_id = read_i32(&buffer[4..8]);
    if auth_id == -1 || auth_id != AUTH_REQUEST_ID {
        return Ok(ProbeResult::Unavailable);
    }

    // Execute the player listing under the next request id
    let exec = encode_packet(AUTH_REQUEST_ID + 1, TYPE_EXEC, PLAYER_LIST_COMMAND);
    timeout(wait, stream.write_all(&exec))
        .await
        .map_err(timed_out)??;

    let mut response = [0u8; 4096];
    let len = timeout(wait, stream.read(&mut response))
        .await
        .map_err(timed_out)??;
    if len < HEADER_LEN {
        // Connected and queried; a short reply means an empty player list
        return Ok(ProbeResult::online(0, DEFAULT_MAX_PLAYERS));
    }

    let body = decode_body(&response[HEADER_LEN..len]);
    // The RCON response carries no capacity field
    Ok(ProbeResult::online(count_players(&body), DEFAULT_MAX_PLAYERS))
}

fn timed_out(_: tokio::time::error::Elapsed) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "rcon exchange timed out")
}

/// Builds one RCON frame: little-endian length prefix, request id, packet
/// type, body bytes and two trailing NULs.
pub fn encode_packet(request_id: i32, packet_type: i32, body: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(body.len() + 10);
    payload.extend_from_slice(&request_id.to_le_bytes());
    payload.extend_from_slice(&packet_type.to_le_bytes());
    payload.extend_from_slice(body.as_bytes());
    payload.extend_from_slice(&[0, 0]);

    let mut packet = Vec::with_capacity(payload.len() + 4);
    packet.extend_from_slice(&(payload.len() as i32).to_le_bytes());
    packet.extend_from_slice(&payload);
    packet
}

fn read_i32(bytes: &[u8]) -> i32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    i32::from_le_bytes(raw)
}

fn decode_body(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_string()
}

/// Best-effort player count over a `ShowPlayers` reply.
///
/// Two ordered tiers: first count lines that look like player entries,
/// skipping server chatter; only if that finds nothing, fall back to the
/// regex patterns over the whole body. An empty body counts as zero.
pub fn count_players(body: &str) -> u32 {
    let text = body.trim();
    if text.is_empty() {
        return 0;
    }

    let mut count = 0;
    for line in text.lines() {
        let line = line.trim().to_lowercase();
        if line.is_empty() {
            continue;
        }
        if EXCLUDED_PREFIXES
            .iter()
            .any(|prefix| line.starts_with(prefix))
        {
            continue;
        }
        if PLAYER_LINE_KEYWORDS
            .iter()
            .any(|keyword| line.contains(keyword))
        {
            count += 1;
        }
    }
    if count > 0 {
        return count;
    }

    for pattern in PLAYER_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            let matches = re.find_iter(text).count();
            if matches > 0 {
                return matches as u32;
            }
        }
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_packet_layout() {
        let packet = encode_packet(AUTH_REQUEST_ID, TYPE_AUTH, "secret");

        // length prefix covers id + type + body + two NULs
        assert_eq!(read_i32(&packet[0..4]), 16);
        assert_eq!(read_i32(&packet[4..8]), AUTH_REQUEST_ID);
        assert_eq!(read_i32(&packet[8..12]), TYPE_AUTH);
        assert_eq!(&packet[12..18], b"secret");
        assert_eq!(&packet[18..], &[0, 0]);
        assert_eq!(packet.len(), 20);
    }

    #[test]
    fn test_encode_packet_empty_body() {
        let packet = encode_packet(1, TYPE_EXEC, "");
        assert_eq!(read_i32(&packet[0..4]), 10);
        assert_eq!(packet.len(), 14);
    }

    #[test]
    fn test_decode_body_strips_trailing_nulls() {
        assert_eq!(decode_body(b"hello\0\0"), "hello");
        assert_eq!(decode_body(b""), "");
        assert_eq!(decode_body(b"\0\0"), "");
    }

    #[test]
    fn test_count_players_empty_body() {
        assert_eq!(count_players(""), 0);
        assert_eq!(count_players("   \n  \t"), 0);
    }

    #[test]
    fn test_count_players_keyword_lines() {
        let body = "name: alice\nname: bob\nname: carol";
        assert_eq!(count_players(body), 3);
    }

    #[test]
    fn test_count_players_skips_server_chatter() {
        let body = "Welcome to the server\nServer name: mine\nVersion: 1.2\nname: alice";
        assert_eq!(count_players(body), 1);
    }

    #[test]
    fn test_count_players_uid_lines() {
        let body = "alice, uid: 1001, steamid: 7656\nbob, uid: 1002, steamid: 7657";
        assert_eq!(count_players(body), 2);
    }

    #[test]
    fn test_count_players_case_insensitive() {
        assert_eq!(count_players("NAME: Alice\nName: Bob"), 2);
    }

    #[test]
    fn test_count_players_regex_tier() {
        // Every keyword line starts with an excluded prefix, so only the
        // regex tier can see the entries
        let body = "server roster -> name: alice\nserver roster -> name: bob";
        assert_eq!(count_players(body), 2);
    }

    #[test]
    fn test_count_players_no_matches() {
        assert_eq!(count_players("nothing useful here\nstill nothing"), 0);
    }
}
