//! Performance benchmarks for the per-message and per-frame hot paths

use client::rendering::grid_rows;
use client::world::WorldStore;
use serde_json::json;
use shared::{decode, encode_intent, Direction, InboundMessage, Intent};
use std::time::Instant;

fn crowded_world_update(players: usize, npcs: usize) -> String {
    let other_players: Vec<_> = (0..players)
        .map(|i| json!({"id": format!("player-{}", i), "pos": [i % 20, i % 10]}))
        .collect();
    let npcs: Vec<_> = (0..npcs)
        .map(|i| json!({"id": format!("npc-{}", i), "pos": [i % 20, i % 10], "name": "Guard"}))
        .collect();

    json!({
        "type": "world_update",
        "my_pos": [3, 4],
        "map_id": "Town",
        "map_dimensions": [20, 10],
        "other_players": other_players,
        "npcs": npcs,
    })
    .to_string()
}

/// Benchmarks decoding a world update with a busy roster
#[test]
fn benchmark_decode_world_update() {
    let raw = crowded_world_update(50, 20);

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let message = decode(&raw).unwrap();
        assert!(matches!(message, InboundMessage::WorldUpdate(_)));
    }

    let duration = start.elapsed();
    println!(
        "World update decode: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // A 60 Hz server sends far fewer than this per second
    assert!(duration.as_secs() < 10);
}

/// Benchmarks applying updates and taking snapshots through the store lock
#[test]
fn benchmark_apply_and_snapshot() {
    let update = match decode(&crowded_world_update(50, 20)).unwrap() {
        InboundMessage::WorldUpdate(update) => update,
        other => panic!("Wrong message type after decode: {:?}", other),
    };
    let store = WorldStore::new("bench");

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        store.apply_world_update(&update);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.other_players.len(), 50);
    }

    let duration = start.elapsed();
    println!(
        "Apply + snapshot: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_secs() < 10);
}

/// Benchmarks building the text grid drawn every frame
#[test]
fn benchmark_grid_rows() {
    let store = WorldStore::new("bench");
    if let InboundMessage::WorldUpdate(update) = decode(&crowded_world_update(50, 20)).unwrap() {
        store.apply_world_update(&update);
    }
    let snapshot = store.snapshot();

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let rows = grid_rows(&snapshot);
        assert_eq!(rows.len(), 10);
    }

    let duration = start.elapsed();
    println!(
        "Grid build: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_secs() < 10);
}

/// Benchmarks encoding the per-tick movement intents
#[test]
fn benchmark_encode_movement() {
    let intents = [
        Intent::Move(Direction::Up),
        Intent::Move(Direction::Left),
        Intent::Move(Direction::Down),
        Intent::Move(Direction::Right),
    ];

    let iterations = 25_000;
    let start = Instant::now();

    for i in 0..iterations {
        let text = encode_intent(&intents[i % intents.len()]).unwrap();
        assert!(text.starts_with('{'));
    }

    let duration = start.elapsed();
    println!(
        "Movement encode: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(duration.as_secs() < 10);
}
