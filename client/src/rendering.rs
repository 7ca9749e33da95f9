use crate::network::SessionStatus;
use crate::world::WorldState;
use macroquad::prelude::*;

pub const CHAT_LINES_SHOWN: usize = 5;

const FONT_SIZE: f32 = 24.0;
const LINE_HEIGHT: f32 = 20.0;
const MARGIN: f32 = 10.0;

/// Most cells that fit the 800x600 window above the chat log; anything
/// beyond is cropped rather than built.
pub const MAX_GRID_COLS: usize = 40;
pub const MAX_GRID_ROWS: usize = 20;

const EMPTY_CELL: char = '.';
const NPC_CELL: char = 'N';
const PLAYER_CELL: char = 'P';
const SELF_CELL: char = '@';

pub fn header_line(state: &WorldState) -> String {
    let (x, y) = state.self_position;
    format!(
        "--- Map: {} | You: {} @ [{}, {}] ---",
        state.current_map_id, state.self_id, x, y
    )
}

pub fn status_line(status: SessionStatus) -> String {
    let label = match status {
        SessionStatus::Idle => "idle",
        SessionStatus::Connecting => "connecting",
        SessionStatus::Handshaking => "handshaking",
        SessionStatus::Active => "connected",
        SessionStatus::Closed => "disconnected",
    };
    format!("Server: {}", label)
}

/// Text rows of the map, NPCs under players under the local player.
/// Only the top-left window-sized corner of a large map is drawn.
pub fn grid_rows(state: &WorldState) -> Vec<String> {
    let width = (state.map_dimensions.0.max(0) as usize).min(MAX_GRID_COLS);
    let height = (state.map_dimensions.1.max(0) as usize).min(MAX_GRID_ROWS);
    let mut grid = vec![vec![EMPTY_CELL; width]; height];

    let mut place = |(x, y): (i32, i32), cell: char| {
        if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
            grid[y as usize][x as usize] = cell;
        }
    };

    for npc in state.npcs.values() {
        place(npc.position, NPC_CELL);
    }
    for player in state.other_players.values() {
        place(player.position, PLAYER_CELL);
    }
    place(state.self_position, SELF_CELL);

    grid.iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let cells: Vec<String> = row.iter().map(char::to_string).collect();
            format!("{:02} {}", row_idx, cells.join(" "))
        })
        .collect()
}

/// Draws one frame from a snapshot. Holds no game state of its own.
pub struct Renderer {
    text_color: Color,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer { text_color: WHITE }
    }

    pub fn render(&self, state: &WorldState, input_line: &str, status: SessionStatus) {
        clear_background(BLACK);

        self.draw_line(&header_line(state), MARGIN, MARGIN);
        let status_text = status_line(status);
        let status_width = measure_text(&status_text, None, FONT_SIZE as u16, 1.0).width;
        self.draw_line(&status_text, screen_width() - status_width - MARGIN, MARGIN);

        let mut y = 40.0;
        for row in grid_rows(state) {
            self.draw_line(&row, MARGIN, y);
            y += LINE_HEIGHT;
        }

        y += LINE_HEIGHT;
        self.draw_line("--- Chat Log (Last 5) ---", MARGIN, y);
        y += LINE_HEIGHT;
        for entry in state.recent_chat(CHAT_LINES_SHOWN) {
            self.draw_line(entry, MARGIN, y);
            y += LINE_HEIGHT;
        }

        self.draw_line(&format!("> {}", input_line), MARGIN, y + LINE_HEIGHT);
    }

    // `top` is the top of the line; macroquad positions text by baseline.
    fn draw_line(&self, text: &str, x: f32, top: f32) {
        draw_text(text, x, top + LINE_HEIGHT * 0.8, FONT_SIZE, self.text_color);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Npc, RemotePlayer};

    fn small_world() -> WorldState {
        let mut state = WorldState::new("me");
        state.map_dimensions = (4, 3);
        state.self_position = (0, 0);
        state
    }

    #[test]
    fn test_header_line() {
        let mut state = WorldState::new("CoolCat123");
        state.current_map_id = "Town".to_string();
        state.self_position = (3, 4);
        assert_eq!(
            header_line(&state),
            "--- Map: Town | You: CoolCat123 @ [3, 4] ---"
        );
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(SessionStatus::Active), "Server: connected");
        assert_eq!(status_line(SessionStatus::Closed), "Server: disconnected");
    }

    #[test]
    fn test_empty_grid_shape() {
        let mut state = small_world();
        state.self_position = (-1, -1);
        assert_eq!(grid_rows(&state), vec!["00 . . . .", "01 . . . .", "02 . . . ."]);
    }

    #[test]
    fn test_grid_layers() {
        let mut state = small_world();
        state.npcs.insert(
            "n1".to_string(),
            Npc {
                position: (1, 1),
                display_name: "Guard".to_string(),
            },
        );
        state.npcs.insert(
            "n2".to_string(),
            Npc {
                position: (2, 2),
                display_name: "NPC".to_string(),
            },
        );
        // A player standing on an NPC hides it; the local player hides both.
        state
            .other_players
            .insert("A".to_string(), RemotePlayer { position: (2, 2) });
        state
            .other_players
            .insert("B".to_string(), RemotePlayer { position: (0, 0) });

        assert_eq!(grid_rows(&state), vec!["00 @ . . .", "01 . N . .", "02 . . P ."]);
    }

    #[test]
    fn test_grid_skips_out_of_bounds() {
        let mut state = small_world();
        state.self_position = (4, 0);
        state
            .other_players
            .insert("A".to_string(), RemotePlayer { position: (0, 3) });
        state
            .other_players
            .insert("B".to_string(), RemotePlayer { position: (-1, 1) });

        assert_eq!(grid_rows(&state), vec!["00 . . . .", "01 . . . .", "02 . . . ."]);
    }

    #[test]
    fn test_grid_with_degenerate_dimensions() {
        let mut state = small_world();
        state.map_dimensions = (-2, 0);
        assert!(grid_rows(&state).is_empty());
    }

    #[test]
    fn test_default_grid_row_labels() {
        let rows = grid_rows(&WorldState::new("me"));
        assert_eq!(rows.len(), 10);
        assert!(rows[5].starts_with("05 "));
        assert_eq!(rows[5].chars().filter(|c| *c == '@').count(), 1);
        assert_eq!(rows[9].len(), "09 ".len() + 20 * 2 - 1);
    }

    #[test]
    fn test_huge_dimensions_are_cropped_to_window() {
        let mut state = small_world();
        state.map_dimensions = (4000, 4000);
        state.self_position = (1, 1);
        state
            .other_players
            .insert("far".to_string(), RemotePlayer { position: (3000, 3000) });

        let rows = grid_rows(&state);
        assert_eq!(rows.len(), MAX_GRID_ROWS);
        assert!(rows
            .iter()
            .all(|row| row.len() == "00 ".len() + MAX_GRID_COLS * 2 - 1));
        assert!(rows[1].contains('@'));
        assert!(rows.iter().all(|row| !row.contains('P')));

        state.map_dimensions = (i32::MAX, i32::MAX);
        assert_eq!(grid_rows(&state).len(), MAX_GRID_ROWS);
    }
}
