//! Shared world snapshot written by the synchronizer and read by the frame loop

use log::debug;
use shared::{Dimensions, Position, WorldUpdate};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_POSITION: Position = (5, 5);
pub const DEFAULT_MAP_ID: &str = "Loading Zone...";
pub const DEFAULT_MAP_DIMENSIONS: Dimensions = (20, 10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePlayer {
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Npc {
    pub position: Position,
    pub display_name: String,
}

/// Everything the presentation layer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldState {
    pub self_id: String,
    pub self_position: Position,
    pub current_map_id: String,
    pub map_dimensions: Dimensions,
    pub other_players: HashMap<String, RemotePlayer>,
    pub npcs: HashMap<String, Npc>,
    pub chat_log: Vec<String>,
    /// Milliseconds since the Unix epoch of the last applied world update, 0 before the first
    pub last_update_timestamp: u64,
}

impl WorldState {
    pub fn new(self_id: impl Into<String>) -> Self {
        Self {
            self_id: self_id.into(),
            self_position: DEFAULT_POSITION,
            current_map_id: DEFAULT_MAP_ID.to_string(),
            map_dimensions: DEFAULT_MAP_DIMENSIONS,
            other_players: HashMap::new(),
            npcs: HashMap::new(),
            chat_log: Vec::new(),
            last_update_timestamp: 0,
        }
    }

    /// The last `count` chat lines, oldest first
    pub fn recent_chat(&self, count: usize) -> &[String] {
        let start = self.chat_log.len().saturating_sub(count);
        &self.chat_log[start..]
    }

    pub fn apply_world_update(&mut self, update: &WorldUpdate, timestamp: u64) {
        if let Some(position) = update.my_pos {
            self.self_position = position;
        }
        if let Some(map_id) = &update.map_id {
            self.current_map_id = map_id.clone();
        }
        if let Some(dimensions) = update.map_dimensions {
            self.map_dimensions = dimensions;
        }

        // Rosters are complete on every update: replace, never merge.
        // A missing roster decodes as empty and clears the map.
        self.other_players = update
            .other_players
            .iter()
            .map(|p| (p.id.clone(), RemotePlayer { position: p.pos }))
            .collect();
        self.npcs = update
            .npcs
            .iter()
            .map(|n| {
                (
                    n.id.clone(),
                    Npc {
                        position: n.pos,
                        display_name: n.name.clone(),
                    },
                )
            })
            .collect();

        self.last_update_timestamp = timestamp;
    }
}

/// Thread-safe owner of the [`WorldState`].
///
/// Every mutation holds the write lock for its full duration and every
/// snapshot clones under the read lock, so a reader sees either all of an
/// update or none of it. Cloning the store shares the same state.
#[derive(Debug, Clone)]
pub struct WorldStore {
    inner: Arc<RwLock<WorldState>>,
}

impl WorldStore {
    pub fn new(self_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(WorldState::new(self_id))),
        }
    }

    pub fn snapshot(&self) -> WorldState {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn apply_world_update(&self, update: &WorldUpdate) {
        let timestamp = get_timestamp();
        self.write(|state| state.apply_world_update(update, timestamp));
        debug!("Applied world update at {}", timestamp);
    }

    pub fn append_chat(&self, sender: &str, message: &str) {
        let line = format!("[{}]: {}", sender, message);
        self.write(|state| state.chat_log.push(line));
    }

    pub fn ack_connection(&self, id: &str) {
        self.write(|state| state.self_id = id.to_string());
    }

    fn write(&self, mutate: impl FnOnce(&mut WorldState)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        mutate(&mut guard);
    }
}

fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}
