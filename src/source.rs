//! External command engine seams
//!
//! The bridge hands intercepted text to a [`CommandExecutor`] and asks a
//! [`SuggestionEngine`] for completions, always on behalf of a
//! [`PacketCommandSource`] that names the connection's player.

use std::fmt;

use crate::error::Result;

/// Command source synthesized for a proxied player
#[derive(Debug, Clone)]
pub struct PacketCommandSource {
    pub player: String,
    /// The raw text that produced this source
    pub text: String,
}

impl PacketCommandSource {
    pub fn new(player: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            text: text.into(),
        }
    }

    pub fn is_player(&self) -> bool {
        true
    }
}

impl PartialEq for PacketCommandSource {
    fn eq(&self, other: &Self) -> bool {
        self.player == other.player
    }
}

impl Eq for PacketCommandSource {}

impl fmt::Display for PacketCommandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetworkPlayer {}", self.player)
    }
}

/// One completion candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// The part of the input this candidate already matches
    pub existed_input: String,
    /// Full replacement text
    pub command: String,
}

impl Suggestion {
    pub fn new(existed_input: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            existed_input: existed_input.into(),
            command: command.into(),
        }
    }
}

/// Completion side of the external command engine
pub trait SuggestionEngine: Send + Sync {
    /// Ranked candidates for `text`
    fn suggest(&self, text: &str, source: &PacketCommandSource) -> Vec<Suggestion>;
}

/// Execution side of the external command engine
///
/// Feedback reaches the player through the executor's own reply channel.
/// An `Err` is only logged by the bridge.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, text: &str, source: &PacketCommandSource) -> Result<()>;
}
