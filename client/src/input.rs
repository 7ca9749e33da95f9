//! Keyboard input: the typed command line and held movement keys

use macroquad::prelude::*;
use shared::Direction;

/// Line-editing events delivered once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Char(char),
    Backspace,
    Submit,
}

/// The command line being typed
#[derive(Debug, Default, Clone)]
pub struct InputLine {
    buffer: String,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Applies one event. `Submit` returns the trimmed line and always
    /// empties the buffer.
    pub fn on_key_event(&mut self, event: KeyEvent) -> Option<String> {
        match event {
            KeyEvent::Char(c) if !c.is_control() => {
                self.buffer.push(c);
                None
            }
            KeyEvent::Char(_) => None,
            KeyEvent::Backspace => {
                self.buffer.pop();
                None
            }
            KeyEvent::Submit => Some(std::mem::take(&mut self.buffer).trim().to_string()),
        }
    }
}

/// Everything the frame loop needs from the keyboard for one tick
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameInput {
    pub submitted: Vec<String>,
    pub movement: Vec<Direction>,
}

// Order matters: directions are reported up, left, down, right.
const MOVEMENT_KEYS: [(Direction, KeyCode, KeyCode); 4] = [
    (Direction::Up, KeyCode::W, KeyCode::Up),
    (Direction::Left, KeyCode::A, KeyCode::Left),
    (Direction::Down, KeyCode::S, KeyCode::Down),
    (Direction::Right, KeyCode::D, KeyCode::Right),
];

/// Directions whose key is currently down. Level-triggered: a held key is
/// reported every tick.
pub fn held_directions(is_down: impl Fn(KeyCode) -> bool) -> Vec<Direction> {
    MOVEMENT_KEYS
        .iter()
        .filter(|(_, primary, alternate)| is_down(*primary) || is_down(*alternate))
        .map(|(direction, _, _)| *direction)
        .collect()
}

/// Samples macroquad's keyboard state once per frame
#[derive(Debug, Default)]
pub struct InputManager {
    line: InputLine,
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_line(&self) -> &str {
        self.line.as_str()
    }

    pub fn update(&mut self) -> FrameInput {
        let mut frame = FrameInput::default();

        for event in Self::poll_key_events() {
            if let Some(line) = self.line.on_key_event(event) {
                frame.submitted.push(line);
            }
        }
        frame.movement = Self::poll_movement_keys();

        frame
    }

    fn poll_key_events() -> Vec<KeyEvent> {
        let mut events = Vec::new();

        // Enter and Backspace arrive as control characters and are filtered here
        while let Some(c) = get_char_pressed() {
            if !c.is_control() {
                events.push(KeyEvent::Char(c));
            }
        }
        if is_key_pressed(KeyCode::Backspace) {
            events.push(KeyEvent::Backspace);
        }
        if is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter) {
            events.push(KeyEvent::Submit);
        }

        events
    }

    pub fn poll_movement_keys() -> Vec<Direction> {
        held_directions(is_key_down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(line: &mut InputLine, text: &str) {
        for c in text.chars() {
            assert_eq!(line.on_key_event(KeyEvent::Char(c)), None);
        }
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut line = InputLine::new();
        type_text(&mut line, "tallk");
        line.on_key_event(KeyEvent::Backspace);
        line.on_key_event(KeyEvent::Backspace);
        type_text(&mut line, "k");
        assert_eq!(line.as_str(), "talk");
    }

    #[test]
    fn test_backspace_on_empty_line() {
        let mut line = InputLine::new();
        assert_eq!(line.on_key_event(KeyEvent::Backspace), None);
        assert_eq!(line.as_str(), "");
    }

    #[test]
    fn test_control_characters_are_ignored() {
        let mut line = InputLine::new();
        type_text(&mut line, "a\r\u{8}b");
        assert_eq!(line.as_str(), "ab");
    }

    #[test]
    fn test_submit_returns_trimmed_line_and_clears() {
        let mut line = InputLine::new();
        type_text(&mut line, "  talk hello ");
        assert_eq!(
            line.on_key_event(KeyEvent::Submit),
            Some("talk hello".to_string())
        );
        assert_eq!(line.as_str(), "");
    }

    #[test]
    fn test_submit_clears_unrecognized_commands_too() {
        let mut line = InputLine::new();
        type_text(&mut line, "dance");
        assert_eq!(line.on_key_event(KeyEvent::Submit), Some("dance".to_string()));
        assert_eq!(line.as_str(), "");
        assert_eq!(line.on_key_event(KeyEvent::Submit), Some(String::new()));
    }

    #[test]
    fn test_held_directions_none() {
        assert!(held_directions(|_| false).is_empty());
    }

    #[test]
    fn test_held_directions_wasd_and_arrows() {
        let held = held_directions(|key| matches!(key, KeyCode::D | KeyCode::Up));
        assert_eq!(held, vec![Direction::Up, Direction::Right]);

        let all = held_directions(|_| true);
        assert_eq!(
            all,
            vec![
                Direction::Up,
                Direction::Left,
                Direction::Down,
                Direction::Right
            ]
        );
    }

    #[test]
    fn test_held_key_repeats_every_tick() {
        let is_down = |key: KeyCode| key == KeyCode::S;
        for _ in 0..3 {
            assert_eq!(held_directions(is_down), vec![Direction::Down]);
        }
    }
}
