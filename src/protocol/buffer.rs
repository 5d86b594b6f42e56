//! Primitive codec
//!
//! Cursor-style reader and builder for the game protocol's primitive types.
//!
//! ## Encodings
//! - VarInt: 7 data bits per byte, high bit = continuation, at most 5 bytes,
//!   negative values are sent as their two's complement `u32`
//! - String: VarInt byte length + UTF-8 bytes (at most 32767 chars)
//! - Bool: one byte, 0x00 or 0x01
//! - Int / Long / Float / Double: fixed width, big-endian

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, SpliceError};

/// Maximum number of bytes in a VarInt
pub const MAX_VARINT_LEN: usize = 5;

/// Maximum string length in characters
pub const MAX_STRING_CHARS: usize = 32767;

/// Number of bytes `value` occupies as a VarInt
pub fn varint_len(value: i32) -> usize {
    let mut value = value as u32;
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

// =============================================================================
// Reader
// =============================================================================

/// Reads primitives from a packet body
///
/// Every read checks the remaining length first, so a truncated packet
/// surfaces as a `Format` error and never panics.
#[derive(Debug, Clone)]
pub struct PacketReader {
    buf: Bytes,
}

impl PacketReader {
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self { buf: buf.into() }
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Take everything that has not been read yet
    pub fn rest(&mut self) -> Bytes {
        self.buf.split_off(0)
    }

    /// Fail if unread bytes remain
    pub fn expect_end(&self, what: &str) -> Result<()> {
        if self.buf.has_remaining() {
            return Err(SpliceError::format(format!(
                "{}: {} trailing bytes",
                what,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    fn need(&self, count: usize, what: &str) -> Result<()> {
        if self.buf.remaining() < count {
            return Err(SpliceError::format(format!(
                "truncated {}: need {} bytes, have {}",
                what,
                count,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    pub fn read_varint(&mut self) -> Result<i32> {
        let mut value: u32 = 0;
        for position in 0..MAX_VARINT_LEN {
            self.need(1, "VarInt")?;
            let byte = self.buf.get_u8();
            // Only the low 4 bits of the fifth byte fit in 32 bits
            if position == MAX_VARINT_LEN - 1 && byte & 0xF0 != 0 {
                return Err(SpliceError::format(format!(
                    "VarInt overflows 32 bits (last byte 0x{:02x})",
                    byte
                )));
            }
            value |= ((byte & 0x7F) as u32) << (7 * position);
            if byte & 0x80 == 0 {
                return Ok(value as i32);
            }
        }
        Err(SpliceError::format("VarInt longer than 5 bytes"))
    }

    /// Read a VarInt that must be a non-negative count or index
    pub fn read_varint_usize(&mut self, what: &str) -> Result<usize> {
        let value = self.read_varint()?;
        usize::try_from(value)
            .map_err(|_| SpliceError::format(format!("negative {}: {}", what, value)))
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_varint_usize("string length")?;
        if len > MAX_STRING_CHARS * 4 {
            return Err(SpliceError::format(format!(
                "string of {} bytes exceeds protocol limit",
                len
            )));
        }
        self.need(len, "string")?;
        let raw = self.buf.split_to(len);
        let text = String::from_utf8(raw.to_vec())
            .map_err(|e| SpliceError::format(format!("invalid UTF-8 in string: {}", e)))?;
        if text.chars().count() > MAX_STRING_CHARS {
            return Err(SpliceError::format(format!(
                "string exceeds {} characters",
                MAX_STRING_CHARS
            )));
        }
        Ok(text)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_byte()? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            other => Err(SpliceError::format(format!(
                "invalid boolean byte 0x{:02x}",
                other
            ))),
        }
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.need(1, "byte")?;
        Ok(self.buf.get_u8())
    }

    pub fn read_int(&mut self) -> Result<i32> {
        self.need(4, "int")?;
        Ok(self.buf.get_i32())
    }

    pub fn read_long(&mut self) -> Result<i64> {
        self.need(8, "long")?;
        Ok(self.buf.get_i64())
    }

    pub fn read_float(&mut self) -> Result<f32> {
        self.need(4, "float")?;
        Ok(self.buf.get_f32())
    }

    pub fn read_double(&mut self) -> Result<f64> {
        self.need(8, "double")?;
        Ok(self.buf.get_f64())
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builds a packet body
///
/// Writes cannot fail; callers validate values before writing so a packet
/// is either fully built or never started.
#[derive(Debug, Clone, Default)]
pub struct PacketBuffer {
    buf: BytesMut,
}

impl PacketBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a packet with its id already written
    pub fn with_id(packet_id: i32) -> Self {
        let mut buffer = Self::new();
        buffer.write_varint(packet_id);
        buffer
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Finish the packet
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn write_varint(&mut self, value: i32) -> &mut Self {
        let mut value = value as u32;
        while value >= 0x80 {
            self.buf.put_u8((value as u8 & 0x7F) | 0x80);
            value >>= 7;
        }
        self.buf.put_u8(value as u8);
        self
    }

    /// Write a length or index; lengths beyond `i32::MAX` do not occur in
    /// packets this crate builds
    pub fn write_varint_usize(&mut self, value: usize) -> &mut Self {
        self.write_varint(value as i32)
    }

    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.write_varint_usize(value.len());
        self.buf.put_slice(value.as_bytes());
        self
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.buf.put_u8(value as u8);
        self
    }

    pub fn write_byte(&mut self, value: u8) -> &mut Self {
        self.buf.put_u8(value);
        self
    }

    pub fn write_int(&mut self, value: i32) -> &mut Self {
        self.buf.put_i32(value);
        self
    }

    pub fn write_long(&mut self, value: i64) -> &mut Self {
        self.buf.put_i64(value);
        self
    }

    pub fn write_float(&mut self, value: f32) -> &mut Self {
        self.buf.put_f32(value);
        self
    }

    pub fn write_double(&mut self, value: f64) -> &mut Self {
        self.buf.put_f64(value);
        self
    }

    pub fn write_bytes(&mut self, value: &[u8]) -> &mut Self {
        self.buf.put_slice(value);
        self
    }
}
