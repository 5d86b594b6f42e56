//! Tests for the interception router
//!
//! These tests verify:
//! - Escape prefix classification of chat and completion text
//! - Dispatch tables follow the config switches

use cmdsplice::network::{is_escaped, route_suggestion, DispatchTable, PacketKind};
use cmdsplice::protocol::{Direction, PacketIds};
use cmdsplice::Config;

// =============================================================================
// Prefix Routing Tests
// =============================================================================

#[test]
fn test_escaped_text() {
    assert!(is_escaped("!!foo", "!!"));
    assert!(is_escaped("!!", "!!"));
    assert!(!is_escaped("foo", "!!"));
    assert!(!is_escaped("!foo", "!!"));
    assert!(!is_escaped("/!!foo", "!!"));
    assert!(!is_escaped("", "!!"));
}

#[test]
fn test_route_suggestion() {
    assert_eq!(route_suggestion("!!foo", "!!"), Some((0, "!!foo")));
    assert_eq!(route_suggestion("/!!foo", "!!"), Some((1, "!!foo")));
    assert_eq!(route_suggestion("foo", "!!"), None);
    assert_eq!(route_suggestion("/foo", "!!"), None);
    assert_eq!(route_suggestion("//!!foo", "!!"), None);
}

#[test]
fn test_route_suggestion_custom_prefix() {
    assert_eq!(route_suggestion("/##x", "##"), Some((1, "##x")));
    assert_eq!(route_suggestion("!!x", "##"), None);
}

// =============================================================================
// Dispatch Table Tests
// =============================================================================

#[test]
fn test_default_config_dispatch() {
    let ids = PacketIds::v1_19_2();
    let table = DispatchTable::build(&Config::default(), &ids);

    assert_eq!(
        table.lookup(Direction::Serverbound, ids.chat_message),
        Some(PacketKind::ChatMessage)
    );
    assert_eq!(
        table.lookup(Direction::Serverbound, ids.chat_command),
        Some(PacketKind::ChatCommand)
    );
    assert_eq!(
        table.lookup(Direction::Serverbound, ids.command_suggestions_request),
        Some(PacketKind::CommandSuggestionsRequest)
    );
    assert_eq!(
        table.lookup(Direction::Clientbound, ids.declare_commands),
        Some(PacketKind::DeclareCommands)
    );
    assert!(!table.handles(PacketKind::ChatPreview));
    assert!(!table.handles(PacketKind::ServerData));
    assert_eq!(table.len(), 4);
}

#[test]
fn test_direction_matters() {
    let ids = PacketIds::v1_19_2();
    let table = DispatchTable::build(&Config::default(), &ids);

    assert_eq!(table.lookup(Direction::Clientbound, ids.chat_message), None);
    assert_eq!(table.lookup(Direction::Serverbound, ids.declare_commands), None);
}

#[test]
fn test_switches_disable_handlers() {
    let ids = PacketIds::v1_19_2();

    let chat_only = Config::builder().proxy_vanilla_commands(false).build();
    let table = DispatchTable::build(&chat_only, &ids);
    assert_eq!(table.len(), 1);
    assert!(table.handles(PacketKind::ChatMessage));
    assert!(!table.handles(PacketKind::DeclareCommands));

    let nothing = Config::builder()
        .proxy_chat_command(false)
        .proxy_vanilla_commands(false)
        .build();
    assert!(DispatchTable::build(&nothing, &ids).is_empty());
}

#[test]
fn test_chat_preview_handlers() {
    let ids = PacketIds::v1_19_2();
    let config = Config::builder().chat_preview(true).build();
    let table = DispatchTable::build(&config, &ids);

    assert_eq!(
        table.lookup(Direction::Serverbound, 0x06),
        Some(PacketKind::ChatPreview)
    );
    assert_eq!(
        table.lookup(Direction::Clientbound, ids.server_data),
        Some(PacketKind::ServerData)
    );
    assert_eq!(table.len(), 6);
}

#[test]
fn test_chat_preview_skipped_without_preview_packets() {
    let ids = PacketIds {
        protocol: 761,
        chat_preview_request: None,
        chat_preview_response: None,
        set_display_chat_preview: None,
        ..PacketIds::v1_19_2()
    };
    let config = Config::builder().chat_preview(true).build();
    let table = DispatchTable::build(&config, &ids);

    assert!(!table.handles(PacketKind::ChatPreview));
    assert!(!table.handles(PacketKind::ServerData));
    assert_eq!(table.len(), 4);
}

#[test]
fn test_empty_table() {
    let table = DispatchTable::empty();
    assert!(table.is_empty());
    assert_eq!(table.lookup(Direction::Serverbound, 0x05), None);
}
