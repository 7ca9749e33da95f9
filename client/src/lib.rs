//! # Game Client Library
//!
//! Client-side synchronization and command dispatch for a tile-based
//! multiplayer world. The server is authoritative: the client never simulates
//! anything itself, it mirrors what the server reports and forwards what the
//! player wants to do.
//!
//! ## Architecture Overview
//!
//! Two schedules run side by side for the life of a session:
//!
//! - the **network schedule**, a tokio task on its own thread, owns the
//!   WebSocket, decodes every inbound frame and applies it to the shared
//!   world state;
//! - the **frame schedule**, the macroquad loop at ~60 Hz, polls the
//!   keyboard, enqueues intents and draws the latest snapshot.
//!
//! The world store is the only data the two share. Outbound intents cross
//! from the frame schedule to the network schedule over a single channel, so
//! the socket only ever has one writer.
//!
//! ## Module Organization
//!
//! ### World Module (`world`)
//! The [`world::WorldState`] snapshot and the lock-guarded
//! [`world::WorldStore`] that hands out consistent copies of it.
//!
//! ### Network Module (`network`)
//! The [`network::Synchronizer`]: connect, handshake, receive loop and the
//! one send path, plus the [`network::SessionHandle`] used by the frame loop.
//!
//! ### Commands Module (`commands`)
//! Parses typed lines (`talk`, `interact`, `quit`) into intents and
//! dispatches them, along with per-tick movement.
//!
//! ### Input Module (`input`)
//! The command-line buffer and held movement keys.
//!
//! ### Rendering Module (`rendering`)
//! Read-only projection of a snapshot onto the window.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::commands::CommandDispatcher;
//! use client::config::ConnectionConfig;
//! use client::network;
//! use client::world::WorldStore;
//!
//! # fn main() -> std::io::Result<()> {
//! let config = ConnectionConfig::new("localhost", 8766, "CoolCat123");
//! let store = WorldStore::new(config.nickname.clone());
//! let session = network::spawn(config, store.clone())?;
//! let dispatcher = CommandDispatcher::new(session.clone());
//!
//! dispatcher.submit_line("talk Hello there");
//! let snapshot = store.snapshot();
//! println!("{} @ {:?}", snapshot.current_map_id, snapshot.self_position);
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod config;
pub mod input;
pub mod network;
pub mod rendering;
pub mod world;
