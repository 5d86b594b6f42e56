//! Parser identifiers and argument property payloads
//!
//! An argument node carries a parser id, resolved through a fixed table to a
//! parser name. A handful of parsers attach an extra payload ("properties");
//! which ones is decided by the [`PropertyRegistry`], the single place to
//! extend when a new payload-carrying parser appears. Parsers missing from
//! the registry carry no payload.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{Result, SpliceError};

use super::buffer::{PacketBuffer, PacketReader};

// =============================================================================
// Parser Table
// =============================================================================

/// Parser names indexed by wire id
pub const PARSER_NAMES: [&str; 48] = [
    "brigadier:bool",
    "brigadier:float",
    "brigadier:double",
    "brigadier:integer",
    "brigadier:long",
    "brigadier:string",
    "minecraft:entity",
    "minecraft:game_profile",
    "minecraft:block_pos",
    "minecraft:column_pos",
    "minecraft:vec3",
    "minecraft:vec2",
    "minecraft:block_state",
    "minecraft:block_predicate",
    "minecraft:item_stack",
    "minecraft:item_predicate",
    "minecraft:color",
    "minecraft:component",
    "minecraft:message",
    "minecraft:nbt",
    "minecraft:nbt_tag",
    "minecraft:nbt_path",
    "minecraft:objective",
    "minecraft:objective_criteria",
    "minecraft:operation",
    "minecraft:particle",
    "minecraft:angle",
    "minecraft:rotation",
    "minecraft:scoreboard_slot",
    "minecraft:score_holder",
    "minecraft:swizzle",
    "minecraft:team",
    "minecraft:item_slot",
    "minecraft:resource_location",
    "minecraft:function",
    "minecraft:entity_anchor",
    "minecraft:int_range",
    "minecraft:float_range",
    "minecraft:dimension",
    "minecraft:gamemode",
    "minecraft:time",
    "minecraft:resource_or_tag",
    "minecraft:resource_or_tag_key",
    "minecraft:resource",
    "minecraft:resource_key",
    "minecraft:template_mirror",
    "minecraft:template_rotation",
    "minecraft:uuid",
];

pub const PARSER_DOUBLE: &str = "brigadier:double";
pub const PARSER_FLOAT: &str = "brigadier:float";
pub const PARSER_INTEGER: &str = "brigadier:integer";
pub const PARSER_LONG: &str = "brigadier:long";
pub const PARSER_STRING: &str = "brigadier:string";
pub const PARSER_ENTITY: &str = "minecraft:entity";
pub const PARSER_SCORE_HOLDER: &str = "minecraft:score_holder";

/// Resolve a wire parser id to its name
pub fn parser_name(id: i32) -> Option<&'static str> {
    usize::try_from(id).ok().and_then(|i| PARSER_NAMES.get(i)).copied()
}

/// Resolve a parser name to its wire id
pub fn parser_id(name: &str) -> Option<i32> {
    PARSER_NAMES
        .iter()
        .position(|candidate| *candidate == name)
        .map(|i| i as i32)
}

// =============================================================================
// Payload Types
// =============================================================================

/// Range flag: a minimum follows
pub const RANGE_HAS_MIN: u8 = 0x01;
/// Range flag: a maximum follows
pub const RANGE_HAS_MAX: u8 = 0x02;

/// Numeric width used by a range payload
pub trait RangeBound: Copy + PartialEq + std::fmt::Debug {
    fn read(reader: &mut PacketReader) -> Result<Self>;
    fn write(self, buffer: &mut PacketBuffer);
}

impl RangeBound for i32 {
    fn read(reader: &mut PacketReader) -> Result<Self> {
        reader.read_int()
    }
    fn write(self, buffer: &mut PacketBuffer) {
        buffer.write_int(self);
    }
}

impl RangeBound for i64 {
    fn read(reader: &mut PacketReader) -> Result<Self> {
        reader.read_long()
    }
    fn write(self, buffer: &mut PacketBuffer) {
        buffer.write_long(self);
    }
}

impl RangeBound for f32 {
    fn read(reader: &mut PacketReader) -> Result<Self> {
        reader.read_float()
    }
    fn write(self, buffer: &mut PacketBuffer) {
        buffer.write_float(self);
    }
}

impl RangeBound for f64 {
    fn read(reader: &mut PacketReader) -> Result<Self> {
        reader.read_double()
    }
    fn write(self, buffer: &mut PacketBuffer) {
        buffer.write_double(self);
    }
}

/// Optional min/max bounds of a numeric argument
///
/// `flags` is kept verbatim so re-encoding reproduces the received byte.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRange<T: RangeBound> {
    pub flags: u8,
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: RangeBound> NumberRange<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        let mut flags = 0;
        if min.is_some() {
            flags |= RANGE_HAS_MIN;
        }
        if max.is_some() {
            flags |= RANGE_HAS_MAX;
        }
        Self { flags, min, max }
    }

    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    fn decode(reader: &mut PacketReader) -> Result<Self> {
        let flags = reader.read_byte()?;
        let min = if flags & RANGE_HAS_MIN != 0 {
            Some(T::read(reader)?)
        } else {
            None
        };
        let max = if flags & RANGE_HAS_MAX != 0 {
            Some(T::read(reader)?)
        } else {
            None
        };
        Ok(Self { flags, min, max })
    }

    fn encode(&self, buffer: &mut PacketBuffer) -> Result<()> {
        if (self.flags & RANGE_HAS_MIN != 0) != self.min.is_some()
            || (self.flags & RANGE_HAS_MAX != 0) != self.max.is_some()
        {
            return Err(SpliceError::format(format!(
                "range flags 0x{:02x} disagree with bounds {:?}..{:?}",
                self.flags, self.min, self.max
            )));
        }
        buffer.write_byte(self.flags);
        if let Some(min) = self.min {
            min.write(buffer);
        }
        if let Some(max) = self.max {
            max.write(buffer);
        }
        Ok(())
    }
}

/// How a `brigadier:string` argument consumes input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum StringKind {
    SingleWord = 0,
    QuotablePhrase = 1,
    GreedyPhrase = 2,
}

impl StringKind {
    pub fn from_wire(tag: i32) -> Result<Self> {
        match tag {
            0 => Ok(StringKind::SingleWord),
            1 => Ok(StringKind::QuotablePhrase),
            2 => Ok(StringKind::GreedyPhrase),
            other => Err(SpliceError::format(format!("unknown string kind {}", other))),
        }
    }
}

/// Parser-specific payload of an argument node
#[derive(Debug, Clone, PartialEq)]
pub enum Properties {
    Integer(NumberRange<i32>),
    Long(NumberRange<i64>),
    Float(NumberRange<f32>),
    Double(NumberRange<f64>),
    String(StringKind),
    Entity { flags: u8 },
    ScoreHolder { flags: u8 },
}

// =============================================================================
// Registry
// =============================================================================

pub type DecodeFn = fn(&mut PacketReader) -> Result<Properties>;
pub type EncodeFn = fn(&Properties, &mut PacketBuffer) -> Result<()>;

/// Decoder/encoder pair for one payload-carrying parser
#[derive(Clone, Copy)]
pub struct PropertyCodec {
    pub decode: DecodeFn,
    pub encode: EncodeFn,
}

/// Parser name → payload codec
#[derive(Clone, Default)]
pub struct PropertyRegistry {
    codecs: HashMap<&'static str, PropertyCodec>,
}

fn mismatch(parser: &str, properties: &Properties) -> SpliceError {
    SpliceError::format(format!(
        "properties {:?} do not belong to parser {}",
        properties, parser
    ))
}

impl PropertyRegistry {
    /// An empty registry: every parser is payload-free
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry covering every payload-carrying parser this crate knows
    pub fn standard() -> &'static PropertyRegistry {
        static STANDARD: OnceLock<PropertyRegistry> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let mut registry = PropertyRegistry::new();
            registry.register(
                PARSER_DOUBLE,
                PropertyCodec {
                    decode: |r| Ok(Properties::Double(NumberRange::decode(r)?)),
                    encode: |p, b| match p {
                        Properties::Double(range) => range.encode(b),
                        other => Err(mismatch(PARSER_DOUBLE, other)),
                    },
                },
            );
            registry.register(
                PARSER_FLOAT,
                PropertyCodec {
                    decode: |r| Ok(Properties::Float(NumberRange::decode(r)?)),
                    encode: |p, b| match p {
                        Properties::Float(range) => range.encode(b),
                        other => Err(mismatch(PARSER_FLOAT, other)),
                    },
                },
            );
            registry.register(
                PARSER_INTEGER,
                PropertyCodec {
                    decode: |r| Ok(Properties::Integer(NumberRange::decode(r)?)),
                    encode: |p, b| match p {
                        Properties::Integer(range) => range.encode(b),
                        other => Err(mismatch(PARSER_INTEGER, other)),
                    },
                },
            );
            registry.register(
                PARSER_LONG,
                PropertyCodec {
                    decode: |r| Ok(Properties::Long(NumberRange::decode(r)?)),
                    encode: |p, b| match p {
                        Properties::Long(range) => range.encode(b),
                        other => Err(mismatch(PARSER_LONG, other)),
                    },
                },
            );
            registry.register(
                PARSER_STRING,
                PropertyCodec {
                    decode: |r| Ok(Properties::String(StringKind::from_wire(r.read_varint()?)?)),
                    encode: |p, b| match p {
                        Properties::String(kind) => {
                            b.write_varint(*kind as i32);
                            Ok(())
                        }
                        other => Err(mismatch(PARSER_STRING, other)),
                    },
                },
            );
            registry.register(
                PARSER_ENTITY,
                PropertyCodec {
                    decode: |r| Ok(Properties::Entity { flags: r.read_byte()? }),
                    encode: |p, b| match p {
                        Properties::Entity { flags } => {
                            b.write_byte(*flags);
                            Ok(())
                        }
                        other => Err(mismatch(PARSER_ENTITY, other)),
                    },
                },
            );
            registry.register(
                PARSER_SCORE_HOLDER,
                PropertyCodec {
                    decode: |r| Ok(Properties::ScoreHolder { flags: r.read_byte()? }),
                    encode: |p, b| match p {
                        Properties::ScoreHolder { flags } => {
                            b.write_byte(*flags);
                            Ok(())
                        }
                        other => Err(mismatch(PARSER_SCORE_HOLDER, other)),
                    },
                },
            );
            registry
        })
    }

    /// Add or replace the codec for a parser name
    pub fn register(&mut self, parser: &'static str, codec: PropertyCodec) {
        self.codecs.insert(parser, codec);
    }

    /// Whether `parser` carries a payload
    pub fn has_payload(&self, parser: &str) -> bool {
        self.codecs.contains_key(parser)
    }

    /// Read the payload for `parser_id`, or `None` if the parser has none
    pub fn decode_properties(
        &self,
        parser_id: i32,
        reader: &mut PacketReader,
    ) -> Result<Option<Properties>> {
        let name = parser_name(parser_id)
            .ok_or_else(|| SpliceError::format(format!("unknown parser id {}", parser_id)))?;
        match self.codecs.get(name) {
            Some(codec) => Ok(Some((codec.decode)(reader)?)),
            None => Ok(None),
        }
    }

    /// Write the payload for `parser_id`
    ///
    /// A payload must be present exactly when the parser is registered.
    pub fn encode_properties(
        &self,
        parser_id: i32,
        properties: Option<&Properties>,
        buffer: &mut PacketBuffer,
    ) -> Result<()> {
        let name = parser_name(parser_id)
            .ok_or_else(|| SpliceError::format(format!("unknown parser id {}", parser_id)))?;
        match (self.codecs.get(name), properties) {
            (Some(codec), Some(properties)) => (codec.encode)(properties, buffer),
            (None, None) => Ok(()),
            (Some(_), None) => Err(SpliceError::format(format!(
                "parser {} requires properties",
                name
            ))),
            (None, Some(properties)) => Err(SpliceError::format(format!(
                "parser {} takes no properties, got {:?}",
                name, properties
            ))),
        }
    }
}
