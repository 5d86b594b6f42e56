//! Tests for the primitive codec
//!
//! These tests verify:
//! - VarInt sizes at the 7-bit group boundaries
//! - Negative VarInts
//! - Truncated and overlong input surfaces as Format errors
//! - Strings, booleans, and big-endian fixed-width numbers

use cmdsplice::protocol::{varint_len, PacketBuffer, PacketReader};
use cmdsplice::SpliceError;

fn varint_bytes(value: i32) -> Vec<u8> {
    let mut buffer = PacketBuffer::new();
    buffer.write_varint(value);
    buffer.as_slice().to_vec()
}

// =============================================================================
// VarInt Tests
// =============================================================================

#[test]
fn test_varint_boundary_sizes() {
    let cases: [(i32, usize); 5] = [(0, 1), (127, 1), (128, 2), (16383, 2), (i32::MAX, 5)];

    for (value, expected_len) in cases {
        let bytes = varint_bytes(value);
        assert_eq!(bytes.len(), expected_len, "value {}", value);
        assert_eq!(varint_len(value), expected_len, "value {}", value);

        let mut reader = PacketReader::new(bytes);
        assert_eq!(reader.read_varint().unwrap(), value);
        assert_eq!(reader.remaining(), 0);
    }
}

#[test]
fn test_varint_exact_bytes() {
    assert_eq!(varint_bytes(0), vec![0x00]);
    assert_eq!(varint_bytes(127), vec![0x7F]);
    assert_eq!(varint_bytes(128), vec![0x80, 0x01]);
    assert_eq!(varint_bytes(16383), vec![0xFF, 0x7F]);
    assert_eq!(varint_bytes(i32::MAX), vec![0xFF, 0xFF, 0xFF, 0xFF, 0x07]);
}

#[test]
fn test_varint_negative_uses_five_bytes() {
    let bytes = varint_bytes(-1);
    assert_eq!(bytes, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);

    let mut reader = PacketReader::new(bytes);
    assert_eq!(reader.read_varint().unwrap(), -1);
}

#[test]
fn test_varint_truncated() {
    let mut reader = PacketReader::new(vec![0x80]);
    let err = reader.read_varint().unwrap_err();
    assert!(err.is_format(), "unexpected error: {:?}", err);
}

#[test]
fn test_varint_empty_input() {
    let mut reader = PacketReader::new(Vec::new());
    assert!(reader.read_varint().unwrap_err().is_format());
}

#[test]
fn test_varint_overlong() {
    let mut reader = PacketReader::new(vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
    match reader.read_varint() {
        Err(SpliceError::Format(msg)) => assert!(msg.contains("longer than 5")),
        other => panic!("Expected Format error, got {:?}", other),
    }
}

#[test]
fn test_varint_rejects_bits_beyond_32() {
    let mut reader = PacketReader::new(vec![0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
    match reader.read_varint() {
        Err(SpliceError::Format(msg)) => assert!(msg.contains("overflows 32 bits")),
        other => panic!("Expected Format error, got {:?}", other),
    }

    let mut reader = PacketReader::new(vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    assert_eq!(reader.read_varint().unwrap(), -1);
    let mut reader = PacketReader::new(vec![0xFF, 0xFF, 0xFF, 0xFF, 0x07]);
    assert_eq!(reader.read_varint().unwrap(), i32::MAX);
}

#[test]
fn test_varint_usize_rejects_negative() {
    let mut reader = PacketReader::new(varint_bytes(-3));
    assert!(reader.read_varint_usize("count").unwrap_err().is_format());
}

// =============================================================================
// String Tests
// =============================================================================

#[test]
fn test_string_round_trip_unicode() {
    let mut buffer = PacketBuffer::new();
    buffer.write_string("!!help §a日本");
    let bytes = buffer.freeze();

    // Length prefix counts bytes, not characters
    assert_eq!(bytes[0] as usize, "!!help §a日本".len());

    let mut reader = PacketReader::new(bytes);
    assert_eq!(reader.read_string().unwrap(), "!!help §a日本");
}

#[test]
fn test_string_empty() {
    let mut buffer = PacketBuffer::new();
    buffer.write_string("");
    assert_eq!(buffer.as_slice(), &[0x00]);

    let mut reader = PacketReader::new(buffer.freeze());
    assert_eq!(reader.read_string().unwrap(), "");
}

#[test]
fn test_string_truncated() {
    let mut buffer = PacketBuffer::new();
    buffer.write_varint(10).write_bytes(b"abc");

    let mut reader = PacketReader::new(buffer.freeze());
    assert!(reader.read_string().unwrap_err().is_format());
}

#[test]
fn test_string_invalid_utf8() {
    let mut buffer = PacketBuffer::new();
    buffer.write_varint(2).write_bytes(&[0xC3, 0x28]);

    let mut reader = PacketReader::new(buffer.freeze());
    assert!(reader.read_string().unwrap_err().is_format());
}

// =============================================================================
// Fixed-Width Tests
// =============================================================================

#[test]
fn test_bool_values() {
    let mut reader = PacketReader::new(vec![0x00, 0x01, 0x02]);
    assert!(!reader.read_bool().unwrap());
    assert!(reader.read_bool().unwrap());
    assert!(reader.read_bool().unwrap_err().is_format());
}

#[test]
fn test_fixed_width_big_endian() {
    let mut buffer = PacketBuffer::new();
    buffer
        .write_int(1)
        .write_long(-2)
        .write_float(1.5)
        .write_double(-0.25);

    let bytes = buffer.freeze();
    assert_eq!(&bytes[..4], &[0x00, 0x00, 0x00, 0x01]);
    assert_eq!(bytes.len(), 4 + 8 + 4 + 8);

    let mut reader = PacketReader::new(bytes);
    assert_eq!(reader.read_int().unwrap(), 1);
    assert_eq!(reader.read_long().unwrap(), -2);
    assert_eq!(reader.read_float().unwrap(), 1.5);
    assert_eq!(reader.read_double().unwrap(), -0.25);
    assert!(reader.expect_end("test").is_ok());
}

#[test]
fn test_fixed_width_truncated() {
    let mut reader = PacketReader::new(vec![0x00, 0x01]);
    assert!(reader.read_int().unwrap_err().is_format());
}

#[test]
fn test_expect_end_reports_trailing_bytes() {
    let reader = PacketReader::new(vec![0x01, 0x02]);
    assert!(reader.expect_end("test").unwrap_err().is_format());
}

#[test]
fn test_with_id_writes_packet_id_first() {
    let mut buffer = PacketBuffer::with_id(0x4E);
    buffer.write_bool(true);
    assert_eq!(buffer.as_slice(), &[0x4E, 0x01]);
}
