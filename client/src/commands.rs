//! Typed-line commands and the single entry point for outbound intents

use crate::network::{SendError, SessionHandle};
use log::debug;
use shared::{Direction, Intent};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
}

/// Parses one submitted line.
///
/// The first whitespace-delimited token names the command and the rest of
/// the line, if any, is its single argument.
pub fn parse(raw: &str) -> Result<Intent, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    let (command, argument) = match raw.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, Some(rest.trim_start())),
        None => (raw, None),
    };

    match command {
        "talk" => match argument {
            Some(message) if !message.is_empty() => Ok(Intent::Chat(message.to_string())),
            _ => Err(ParseError::MissingArgument("talk")),
        },
        "interact" => Ok(Intent::InteractNearby),
        "quit" => Ok(Intent::Disconnect),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

/// Turns user input into intents and hands them to the session
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    session: SessionHandle,
}

impl CommandDispatcher {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// Parses and dispatches a submitted line. Malformed and unknown
    /// commands are dropped silently; the parsed intent is returned so the
    /// caller can react to `Disconnect`.
    pub fn submit_line(&self, line: &str) -> Option<Intent> {
        match parse(line) {
            Ok(intent) => {
                // A failed send is a no-op; the intent is still reported.
                let _ = self.dispatch(intent.clone());
                Some(intent)
            }
            Err(e) => {
                debug!("Ignoring input {:?}: {}", line, e);
                None
            }
        }
    }

    pub fn dispatch(&self, intent: Intent) -> Result<(), SendError> {
        self.session.send_intent(intent).map_err(|e| {
            debug!("Dropped intent: {}", e);
            e
        })
    }

    /// One `Move` per held direction; called once per tick
    pub fn dispatch_movement(&self, directions: &[Direction]) {
        for direction in directions {
            let _ = self.dispatch(Intent::Move(*direction));
        }
    }
}
