//! Performance benchmarks for the hot probe parsing paths

use prober::{rcon, steam};
use shared::{ProbeResult, Protocol, ServerDefinition, ServerRegistry};
use std::time::Instant;

fn valid_info_response(players: u8, max_players: u8) -> Vec<u8> {
    let mut data = vec![0xFF, 0xFF, 0xFF, 0xFF, 0x49, 0x11];
    data.extend_from_slice(b"Benchmark Server\0");
    data.extend_from_slice(b"BenchMap\0");
    data.extend_from_slice(b"benchfolder\0");
    data.extend_from_slice(b"Bench Game\0");
    data.extend_from_slice(&[0x20, 0x06]);
    data.push(players);
    data.push(max_players);
    data
}

/// Benchmarks A2S_INFO response parsing
#[test]
fn benchmark_info_response_parsing() {
    let data = valid_info_response(12, 32);

    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let result = steam::parse_info_response(&data);
        assert_eq!(result, ProbeResult::online(12, 32));
    }

    let duration = start.elapsed();
    println!(
        "A2S parsing: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 1 second for 100k iterations
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks the RCON player-count heuristic over a busy listing
#[test]
fn benchmark_player_count_heuristic() {
    let mut body = String::from("Welcome to the server\n");
    for i in 0..100 {
        body.push_str(&format!("name: player{}, uid: {}, steamid: 7656{}\n", i, i, i));
    }

    let iterations = 1_000;
    let start = Instant::now();

    for _ in 0..iterations {
        assert_eq!(rcon::count_players(&body), 100);
    }

    let duration = start.elapsed();
    println!(
        "Player heuristic: {} iterations in {:?} ({:.2} µs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks RCON frame encoding
#[test]
fn benchmark_packet_encoding() {
    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let packet = rcon::encode_packet(i as i32, 2, "ShowPlayers");
        assert_eq!(packet.len(), 25);
    }

    let duration = start.elapsed();
    println!(
        "RCON encoding: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks registry lookups across a realistic set of definitions
#[test]
fn benchmark_registry_lookup() {
    let mut registry = ServerRegistry::new();
    for i in 0..50 {
        registry.add(ServerDefinition::new(
            &format!("server{}", i),
            &format!("server{}.exe", i),
            Protocol::Steam,
            27000 + i,
        ));
    }

    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let name = format!("server{}", i % 50);
        assert!(registry.get(&name).is_some());
    }

    let duration = start.elapsed();
    println!(
        "Registry lookup: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}
