//! Tests for the parser table and the property registry

use cmdsplice::protocol::{
    parser_id, parser_name, NumberRange, PacketBuffer, PacketReader, Properties, PropertyCodec,
    PropertyRegistry, PARSER_NAMES,
};

// =============================================================================
// Parser Table Tests
// =============================================================================

#[test]
fn test_parser_table_positions() {
    assert_eq!(PARSER_NAMES.len(), 48);
    assert_eq!(parser_name(0), Some("brigadier:bool"));
    assert_eq!(parser_name(3), Some("brigadier:integer"));
    assert_eq!(parser_name(5), Some("brigadier:string"));
    assert_eq!(parser_name(6), Some("minecraft:entity"));
    assert_eq!(parser_name(29), Some("minecraft:score_holder"));
    assert_eq!(parser_name(47), Some("minecraft:uuid"));
}

#[test]
fn test_parser_table_out_of_range() {
    assert_eq!(parser_name(48), None);
    assert_eq!(parser_name(-1), None);
    assert_eq!(parser_id("minecraft:not_a_parser"), None);
}

#[test]
fn test_parser_id_inverts_name() {
    for (id, name) in PARSER_NAMES.iter().enumerate() {
        assert_eq!(parser_id(name), Some(id as i32));
    }
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_standard_registry_payload_parsers() {
    let registry = PropertyRegistry::standard();
    for parser in [
        "brigadier:double",
        "brigadier:float",
        "brigadier:integer",
        "brigadier:long",
        "brigadier:string",
        "minecraft:entity",
        "minecraft:score_holder",
    ] {
        assert!(registry.has_payload(parser), "{} should carry a payload", parser);
    }
    assert!(!registry.has_payload("brigadier:bool"));
    assert!(!registry.has_payload("minecraft:block_pos"));
    assert!(!registry.has_payload("minecraft:time"));
}

#[test]
fn test_empty_registry_treats_everything_as_payload_free() {
    let registry = PropertyRegistry::new();
    let mut reader = PacketReader::new(vec![0x03, 0x00]);

    let properties = registry
        .decode_properties(parser_id("brigadier:integer").unwrap(), &mut reader)
        .unwrap();

    assert_eq!(properties, None);
    assert_eq!(reader.remaining(), 2);
}

#[test]
fn test_registry_extension_with_new_parser() {
    let mut registry = PropertyRegistry::standard().clone();
    registry.register(
        "minecraft:time",
        PropertyCodec {
            decode: |r| Ok(Properties::Integer(NumberRange::new(Some(r.read_int()?), None))),
            encode: |p, b| match p {
                Properties::Integer(NumberRange { min: Some(min), .. }) => {
                    b.write_int(*min);
                    Ok(())
                }
                other => Err(cmdsplice::SpliceError::format(format!("bad time {:?}", other))),
            },
        },
    );
    assert!(registry.has_payload("minecraft:time"));
    assert!(!PropertyRegistry::standard().has_payload("minecraft:time"));

    let time = parser_id("minecraft:time").unwrap();
    let mut buffer = PacketBuffer::new();
    let properties = Properties::Integer(NumberRange::new(Some(20), None));
    registry
        .encode_properties(time, Some(&properties), &mut buffer)
        .unwrap();
    assert_eq!(buffer.as_slice(), &[0x00, 0x00, 0x00, 0x14]);

    let mut reader = PacketReader::new(buffer.freeze());
    let decoded = registry.decode_properties(time, &mut reader).unwrap();
    assert_eq!(decoded, Some(properties));
}

#[test]
fn test_encode_properties_presence_must_match_parser() {
    let registry = PropertyRegistry::standard();
    let mut buffer = PacketBuffer::new();

    let bool_id = parser_id("brigadier:bool").unwrap();
    let stray = Properties::Entity { flags: 0 };
    assert!(registry
        .encode_properties(bool_id, Some(&stray), &mut buffer)
        .unwrap_err()
        .is_format());

    let entity_id = parser_id("minecraft:entity").unwrap();
    assert!(registry
        .encode_properties(entity_id, None, &mut buffer)
        .unwrap_err()
        .is_format());

    assert!(buffer.is_empty());
}

#[test]
fn test_float_range_bit_exact() {
    let registry = PropertyRegistry::standard();
    let float_id = parser_id("brigadier:float").unwrap();

    let mut reader = PacketReader::new(vec![0x02, 0x3F, 0x80, 0x00, 0x00]);
    let decoded = registry.decode_properties(float_id, &mut reader).unwrap();
    assert_eq!(
        decoded,
        Some(Properties::Float(NumberRange {
            flags: 0x02,
            min: None,
            max: Some(1.0),
        }))
    );
}
