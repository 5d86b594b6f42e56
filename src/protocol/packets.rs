//! Packet definitions
//!
//! The chat/command subset of the play protocol the bridge reads or writes.
//! `decode` takes a body positioned after the packet id; `encode` returns a
//! complete packet with the id written first.
//!
//! ### Layouts
//! - Chat Command / Chat Message: text String, then fields the bridge ignores
//! - Command Suggestions Request: transaction id VarInt, text String
//! - Command Suggestions Response: transaction id VarInt, start VarInt,
//!   length VarInt, count VarInt, (match String, has tooltip Bool) * count
//! - Chat Preview (serverbound): query id Int, text String
//! - Chat Preview (clientbound): query id Int, formatted Bool
//! - Chat Suggestions: action VarInt, count VarInt, entry String * count
//! - Server Data: has motd Bool, [motd String], has icon Bool, [icon String],
//!   previews chat Bool, enforces secure chat Bool
//! - Set Display Chat Preview: enabled Bool

use bytes::Bytes;

use crate::error::Result;

use super::buffer::{PacketBuffer, PacketReader};
use super::node::NodeTable;

/// Chat Suggestions action that replaces the client's custom completions
pub const CHAT_SUGGESTIONS_SET: i32 = 2;

/// Read the leading text field of a chat command or chat message
pub fn read_leading_text(body: Bytes) -> Result<String> {
    PacketReader::new(body).read_string()
}

// =============================================================================
// Serverbound
// =============================================================================

/// Tab completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSuggestionsRequest {
    pub transaction_id: i32,
    pub text: String,
}

impl CommandSuggestionsRequest {
    pub fn decode(body: Bytes) -> Result<Self> {
        let mut reader = PacketReader::new(body);
        let transaction_id = reader.read_varint()?;
        let text = reader.read_string()?;
        Ok(Self { transaction_id, text })
    }

    pub fn encode(&self, packet_id: i32) -> Bytes {
        let mut buffer = PacketBuffer::with_id(packet_id);
        buffer.write_varint(self.transaction_id).write_string(&self.text);
        buffer.freeze()
    }
}

/// Chat preview query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPreviewRequest {
    pub query_id: i32,
    pub text: String,
}

impl ChatPreviewRequest {
    pub fn decode(body: Bytes) -> Result<Self> {
        let mut reader = PacketReader::new(body);
        let query_id = reader.read_int()?;
        let text = reader.read_string()?;
        Ok(Self { query_id, text })
    }

    pub fn encode(&self, packet_id: i32) -> Bytes {
        let mut buffer = PacketBuffer::with_id(packet_id);
        buffer.write_int(self.query_id).write_string(&self.text);
        buffer.freeze()
    }
}

// =============================================================================
// Clientbound
// =============================================================================

/// Declare Commands packet
pub fn encode_declare_commands(packet_id: i32, table: &NodeTable) -> Result<Bytes> {
    let mut buffer = PacketBuffer::with_id(packet_id);
    table.encode(&mut buffer)?;
    Ok(buffer.freeze())
}

/// Tab completion response
///
/// Every match replaces the same `[start, start + length)` window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSuggestionsResponse {
    pub transaction_id: i32,
    pub start: usize,
    pub length: usize,
    pub matches: Vec<String>,
}

impl CommandSuggestionsResponse {
    pub fn encode(&self, packet_id: i32) -> Bytes {
        let mut buffer = PacketBuffer::with_id(packet_id);
        buffer
            .write_varint(self.transaction_id)
            .write_varint_usize(self.start)
            .write_varint_usize(self.length)
            .write_varint_usize(self.matches.len());
        for text in &self.matches {
            buffer.write_string(text).write_bool(false);
        }
        buffer.freeze()
    }

    /// Tooltips, if any, are read and dropped
    pub fn decode(body: Bytes) -> Result<Self> {
        let mut reader = PacketReader::new(body);
        let transaction_id = reader.read_varint()?;
        let start = reader.read_varint_usize("suggestion start")?;
        let length = reader.read_varint_usize("suggestion length")?;
        let count = reader.read_varint_usize("suggestion count")?;
        let mut matches = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            matches.push(reader.read_string()?);
            if reader.read_bool()? {
                reader.read_string()?;
            }
        }
        reader.expect_end("command suggestions response")?;
        Ok(Self {
            transaction_id,
            start,
            length,
            matches,
        })
    }
}

/// Chat preview answer; the bridge never sends a formatted preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatPreviewAck {
    pub query_id: i32,
    pub formatted: bool,
}

impl ChatPreviewAck {
    pub fn unformatted(query_id: i32) -> Self {
        Self {
            query_id,
            formatted: false,
        }
    }

    pub fn encode(&self, packet_id: i32) -> Bytes {
        let mut buffer = PacketBuffer::with_id(packet_id);
        buffer.write_int(self.query_id).write_bool(self.formatted);
        buffer.freeze()
    }

    pub fn decode(body: Bytes) -> Result<Self> {
        let mut reader = PacketReader::new(body);
        let query_id = reader.read_int()?;
        let formatted = reader.read_bool()?;
        Ok(Self { query_id, formatted })
    }
}

/// Custom chat completions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSuggestions {
    pub action: i32,
    pub entries: Vec<String>,
}

impl ChatSuggestions {
    /// Replace the client's completions with `entries`
    pub fn set(entries: Vec<String>) -> Self {
        Self {
            action: CHAT_SUGGESTIONS_SET,
            entries,
        }
    }

    pub fn encode(&self, packet_id: i32) -> Bytes {
        let mut buffer = PacketBuffer::with_id(packet_id);
        buffer
            .write_varint(self.action)
            .write_varint_usize(self.entries.len());
        for entry in &self.entries {
            buffer.write_string(entry);
        }
        buffer.freeze()
    }

    pub fn decode(body: Bytes) -> Result<Self> {
        let mut reader = PacketReader::new(body);
        let action = reader.read_varint()?;
        let count = reader.read_varint_usize("chat suggestion count")?;
        let mut entries = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            entries.push(reader.read_string()?);
        }
        reader.expect_end("chat suggestions")?;
        Ok(Self { action, entries })
    }
}

/// Server Data (MOTD, icon, chat flags)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerData {
    pub motd: Option<String>,
    pub icon: Option<String>,
    pub previews_chat: bool,
    pub enforces_secure_chat: bool,
}

impl ServerData {
    pub fn decode(body: Bytes) -> Result<Self> {
        let mut reader = PacketReader::new(body);
        let motd = if reader.read_bool()? {
            Some(reader.read_string()?)
        } else {
            None
        };
        let icon = if reader.read_bool()? {
            Some(reader.read_string()?)
        } else {
            None
        };
        let previews_chat = reader.read_bool()?;
        let enforces_secure_chat = reader.read_bool()?;
        reader.expect_end("server data")?;
        Ok(Self {
            motd,
            icon,
            previews_chat,
            enforces_secure_chat,
        })
    }

    pub fn encode(&self, packet_id: i32) -> Bytes {
        let mut buffer = PacketBuffer::with_id(packet_id);
        buffer.write_bool(self.motd.is_some());
        if let Some(motd) = &self.motd {
            buffer.write_string(motd);
        }
        buffer.write_bool(self.icon.is_some());
        if let Some(icon) = &self.icon {
            buffer.write_string(icon);
        }
        buffer
            .write_bool(self.previews_chat)
            .write_bool(self.enforces_secure_chat);
        buffer.freeze()
    }
}

/// Toggle the client's chat preview UI
pub fn encode_set_display_chat_preview(packet_id: i32, enabled: bool) -> Bytes {
    let mut buffer = PacketBuffer::with_id(packet_id);
    buffer.write_bool(enabled);
    buffer.freeze()
}

/// Split a complete packet into its id and body
pub fn split_packet_id(packet: Bytes) -> Result<(i32, Bytes)> {
    let mut reader = PacketReader::new(packet);
    let packet_id = reader.read_varint()?;
    Ok((packet_id, reader.rest()))
}
