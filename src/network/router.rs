//! Packet interception router
//!
//! Decides, once per connection, which packets the bridge handles, and
//! classifies text against the escape prefix.

use std::collections::HashMap;

use crate::config::Config;
use crate::protocol::{Direction, PacketIds};

/// Packets the bridge can intercept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    ChatCommand,
    ChatMessage,
    CommandSuggestionsRequest,
    ChatPreview,
    DeclareCommands,
    ServerData,
}

/// What happens to the original packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Forward unchanged
    Pass,
    /// Drop; the bridge may have answered in its place
    Cancel,
    /// Drop and tear the connection down
    Disconnect,
}

/// Packet id → kind, for one connection
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    handlers: HashMap<(Direction, i32), PacketKind>,
}

impl DispatchTable {
    /// A table that handles nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register handlers according to the config switches
    pub fn build(config: &Config, ids: &PacketIds) -> Self {
        let mut table = Self::empty();

        if config.proxy_mcdr_chat_command {
            table.insert(Direction::Serverbound, ids.chat_message, PacketKind::ChatMessage);
        }
        if config.register_vanilla_command {
            table.insert(Direction::Serverbound, ids.chat_command, PacketKind::ChatCommand);
            table.insert(
                Direction::Serverbound,
                ids.command_suggestions_request,
                PacketKind::CommandSuggestionsRequest,
            );
            table.insert(Direction::Clientbound, ids.declare_commands, PacketKind::DeclareCommands);
        }
        if config.chat_preview_suggestion {
            match ids.chat_preview_request {
                Some(id) if ids.supports_chat_preview() => {
                    table.insert(Direction::Serverbound, id, PacketKind::ChatPreview);
                    table.insert(Direction::Clientbound, ids.server_data, PacketKind::ServerData);
                }
                _ => tracing::debug!(
                    "Protocol {} has no chat preview, skipping preview handlers",
                    ids.protocol
                ),
            }
        }

        table
    }

    fn insert(&mut self, direction: Direction, packet_id: i32, kind: PacketKind) {
        self.handlers.insert((direction, packet_id), kind);
    }

    pub fn lookup(&self, direction: Direction, packet_id: i32) -> Option<PacketKind> {
        self.handlers.get(&(direction, packet_id)).copied()
    }

    pub fn handles(&self, kind: PacketKind) -> bool {
        self.handlers.values().any(|k| *k == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

/// Whether chat text goes to the external executor
pub fn is_escaped(text: &str, escape_prefix: &str) -> bool {
    text.starts_with(escape_prefix)
}

/// Route a tab completion request's text
///
/// Returns the prefix adjustment and the text to complete, or `None` when
/// the text is not for the external engine. `/!!foo` completes `!!foo`
/// with an adjustment of 1.
pub fn route_suggestion<'a>(text: &'a str, escape_prefix: &str) -> Option<(usize, &'a str)> {
    match text.strip_prefix('/') {
        Some(rest) if rest.starts_with(escape_prefix) => Some((1, rest)),
        _ if text.starts_with(escape_prefix) => Some((0, text)),
        _ => None,
    }
}
