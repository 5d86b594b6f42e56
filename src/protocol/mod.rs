//! Protocol Module
//!
//! Wire codecs for the command/chat subset of the game protocol.
//!
//! ## Layers
//! - `buffer`: primitives (VarInt, String, Bool, fixed-width numbers)
//! - `properties`: parser id table and argument property payloads
//! - `node`: Declare Commands node graph
//! - `packets`: the chat, preview, and suggestion packets
//! - `version`: packet ids per protocol version
//!
//! ### VarInt sizes
//! - 0..=127: 1 byte
//! - 128..=16383: 2 bytes
//! - up to 2^31-1: 5 bytes (negatives always 5)

mod buffer;
mod node;
mod packets;
mod properties;
mod version;

pub use buffer::{varint_len, PacketBuffer, PacketReader, MAX_STRING_CHARS, MAX_VARINT_LEN};
pub use node::{
    Node, NodeKind, NodeTable, FLAG_EXECUTABLE, FLAG_KIND_MASK, FLAG_REDIRECT, FLAG_SUGGESTIONS,
};
pub use packets::{
    encode_declare_commands, encode_set_display_chat_preview, read_leading_text, split_packet_id,
    ChatPreviewAck, ChatPreviewRequest, ChatSuggestions, CommandSuggestionsRequest,
    CommandSuggestionsResponse, ServerData, CHAT_SUGGESTIONS_SET,
};
pub use properties::{
    parser_id, parser_name, NumberRange, Properties, PropertyCodec, PropertyRegistry, RangeBound,
    StringKind, PARSER_DOUBLE, PARSER_ENTITY, PARSER_FLOAT, PARSER_INTEGER, PARSER_LONG,
    PARSER_NAMES, PARSER_SCORE_HOLDER, PARSER_STRING, RANGE_HAS_MAX, RANGE_HAS_MIN,
};
pub use version::{Direction, PacketIds, ProtocolTable, PROTOCOL_1_19_2};
