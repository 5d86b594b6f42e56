//! Protocol versions and packet ids
//!
//! Packet ids move between game versions, so every version the bridge
//! supports needs its own [`PacketIds`] entry.

use std::collections::HashMap;

/// 1.19.1 and 1.19.2
pub const PROTOCOL_1_19_2: i32 = 760;

/// Packet direction relative to the proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client → server
    Serverbound,
    /// Server → client
    Clientbound,
}

/// Packet ids of the packets the bridge touches, for one protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketIds {
    pub protocol: i32,

    // Serverbound
    pub chat_command: i32,
    pub chat_message: i32,
    pub command_suggestions_request: i32,
    /// Only versions with chat preview
    pub chat_preview_request: Option<i32>,

    // Clientbound
    pub declare_commands: i32,
    pub command_suggestions_response: i32,
    pub chat_suggestions: i32,
    pub server_data: i32,
    /// Only versions with chat preview
    pub chat_preview_response: Option<i32>,
    /// Only versions with chat preview
    pub set_display_chat_preview: Option<i32>,
}

impl PacketIds {
    /// 1.19.1 / 1.19.2
    pub const fn v1_19_2() -> Self {
        Self {
            protocol: PROTOCOL_1_19_2,
            chat_command: 0x04,
            chat_message: 0x05,
            command_suggestions_request: 0x09,
            chat_preview_request: Some(0x06),
            declare_commands: 0x0F,
            command_suggestions_response: 0x0E,
            chat_suggestions: 0x15,
            server_data: 0x42,
            chat_preview_response: Some(0x0C),
            set_display_chat_preview: Some(0x4E),
        }
    }

    /// Whether this version still has the chat preview packets
    pub fn supports_chat_preview(&self) -> bool {
        self.chat_preview_request.is_some()
            && self.chat_preview_response.is_some()
            && self.set_display_chat_preview.is_some()
    }
}

/// Protocol version → packet ids
#[derive(Debug, Clone)]
pub struct ProtocolTable {
    versions: HashMap<i32, PacketIds>,
}

impl Default for ProtocolTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(PacketIds::v1_19_2());
        table
    }
}

impl ProtocolTable {
    pub fn empty() -> Self {
        Self {
            versions: HashMap::new(),
        }
    }

    /// Add or replace the ids for `ids.protocol`
    pub fn insert(&mut self, ids: PacketIds) {
        self.versions.insert(ids.protocol, ids);
    }

    pub fn get(&self, protocol: i32) -> Option<&PacketIds> {
        self.versions.get(&protocol)
    }

    pub fn versions(&self) -> impl Iterator<Item = i32> + '_ {
        self.versions.keys().copied()
    }
}
