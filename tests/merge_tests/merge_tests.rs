//! Tests for the command tree merge engine
//!
//! These tests verify:
//! - Synthetic root shape (literal root, greedy args node, declared children)
//! - Holder duplicate semantics
//! - Splicing appends and links without touching the received tree
//! - Independent splices share nothing

use cmdsplice::merge::{MergeOutput, ARGS_NODE_NAME, ASK_SERVER};
use cmdsplice::protocol::{
    parser_id, Node, NodeKind, NodeTable, Properties, StringKind, PARSER_STRING, PROTOCOL_1_19_2,
};
use cmdsplice::registry::{CommandHolder, RootDescriptor};

// =============================================================================
// Helper Functions
// =============================================================================

/// root ─┬─ "list"
///       └─ "say" ── "message"
fn received_tree() -> NodeTable {
    let mut root = Node::root();
    root.children = vec![1, 2];
    let mut say = Node::literal("say");
    say.children = vec![3];
    NodeTable::new(
        vec![
            root,
            Node::literal("list").executable(true),
            say,
            Node::argument(
                "message",
                parser_id("minecraft:message").unwrap(),
                None,
            )
            .executable(true),
        ],
        0,
    )
    .unwrap()
}

fn build(descriptors: &[RootDescriptor]) -> MergeOutput {
    MergeOutput::build(PROTOCOL_1_19_2, descriptors, "!!").unwrap()
}

// =============================================================================
// Build Tests
// =============================================================================

#[test]
fn test_build_root_shape() {
    let output = build(&[RootDescriptor::new("!!MCDR", true)]);

    assert_eq!(output.protocol, PROTOCOL_1_19_2);
    assert_eq!(output.roots.len(), 1);

    let synthetic = &output.roots[0];
    assert_eq!(synthetic.root.kind().unwrap(), NodeKind::Literal);
    assert_eq!(synthetic.root.name.as_deref(), Some("!!MCDR"));
    assert!(synthetic.root.is_executable());
    assert_eq!(synthetic.root.parser_id, None);
    assert_eq!(synthetic.root.properties, None);

    assert_eq!(synthetic.children.len(), 1);
    let args = &synthetic.children[0];
    assert_eq!(args.kind().unwrap(), NodeKind::Argument);
    assert_eq!(args.name.as_deref(), Some(ARGS_NODE_NAME));
    assert!(args.is_executable());
    assert_eq!(args.parser_id, parser_id(PARSER_STRING));
    assert_eq!(args.properties, Some(Properties::String(StringKind::GreedyPhrase)));
    assert_eq!(args.suggestions_type.as_deref(), Some(ASK_SERVER));
}

#[test]
fn test_build_root_always_executable() {
    let output = build(&[RootDescriptor::new("!!calc", false)]);
    assert!(output.roots[0].root.is_executable());
    assert_eq!(output.roots[0].root.flags, 0x05);
    assert!(output.roots[0].children[0].is_executable());
}

#[test]
fn test_build_one_node_per_declared_child() {
    let descriptor = RootDescriptor::new("!!MCDR", true)
        .with_holder(CommandHolder::new(["status", "reload", "plugin"]));
    let output = build(&[descriptor]);

    let children = &output.roots[0].children;
    let names: Vec<&str> = children.iter().filter_map(|n| n.name.as_deref()).collect();
    assert_eq!(names, vec![ARGS_NODE_NAME, "status", "reload", "plugin"]);
    for child in &children[1..] {
        assert_eq!(child.kind().unwrap(), NodeKind::Literal);
    }
}

#[test]
fn test_build_first_holder_without_duplicates_wins() {
    let descriptor = RootDescriptor::new("!!MCDR", true)
        .with_holder(CommandHolder::new(["status"]))
        .with_holder(CommandHolder::new(["reload"]));
    let output = build(&[descriptor]);

    assert_eq!(output.roots[0].children.len(), 2);
    assert_eq!(output.roots[0].children[1].name.as_deref(), Some("status"));
}

#[test]
fn test_build_holders_allowing_duplicates_combine() {
    let descriptor = RootDescriptor::new("!!MCDR", true)
        .with_holder(CommandHolder::new(["status", "reload"]).allow_duplicates(true))
        .with_holder(CommandHolder::new(["reload", "plugin"]));
    let output = build(&[descriptor]);

    let names: Vec<&str> = output.roots[0]
        .children
        .iter()
        .filter_map(|n| n.name.as_deref())
        .collect();
    assert_eq!(names, vec![ARGS_NODE_NAME, "status", "reload", "plugin"]);
}

#[test]
fn test_build_skips_roots_outside_prefix_and_repeats() {
    let output = build(&[
        RootDescriptor::new("!!help", true),
        RootDescriptor::new("gamemode", true),
        RootDescriptor::new("!!help", true).with_holder(CommandHolder::new(["all"])),
        RootDescriptor::new("!!MCDR", true),
    ]);

    let names: Vec<&str> = output
        .roots
        .iter()
        .filter_map(|r| r.root.name.as_deref())
        .collect();
    assert_eq!(names, vec!["!!help", "!!MCDR"]);
    // The first "!!help" wins, so the repeat's child is not built
    assert_eq!(output.roots[0].children.len(), 1);
}

#[test]
fn test_empty_output_adds_nothing() {
    let received = received_tree();
    let merged = MergeOutput::empty(PROTOCOL_1_19_2).splice(&received).unwrap();
    assert_eq!(merged, received);
    assert_eq!(MergeOutput::empty(PROTOCOL_1_19_2).node_count(), 0);
}

// =============================================================================
// Splice Tests
// =============================================================================

#[test]
fn test_splice_appends_and_links() {
    let received = received_tree();
    let output = build(&[
        RootDescriptor::new("!!MCDR", true).with_holder(CommandHolder::new(["status"])),
        RootDescriptor::new("!!help", true),
    ]);
    assert_eq!(output.node_count(), 5);

    let merged = output.splice(&received).unwrap();
    assert_eq!(merged.len(), received.len() + 5);
    assert_eq!(merged.root, received.root);

    // Original children keep their order, synthetic roots follow
    assert_eq!(merged.nodes[0].children, vec![1, 2, 4, 7]);
    assert_eq!(merged.root_literals(), vec!["list", "say", "!!MCDR", "!!help"]);

    assert_eq!(merged.nodes[4].children, vec![5, 6]);
    assert_eq!(merged.nodes[5].name.as_deref(), Some(ARGS_NODE_NAME));
    assert_eq!(merged.nodes[6].name.as_deref(), Some("status"));
    assert!(merged.nodes[6].children.is_empty());

    assert_eq!(merged.nodes[7].children, vec![8]);
    assert_eq!(merged.nodes[8].name.as_deref(), Some(ARGS_NODE_NAME));

    merged.validate().unwrap();
}

#[test]
fn test_splice_leaves_received_untouched() {
    let received = received_tree();
    let before = received.clone();
    let output = build(&[RootDescriptor::new("!!MCDR", true)]);

    output.splice(&received).unwrap();
    output.splice(&received).unwrap();

    assert_eq!(received, before);
}

#[test]
fn test_two_splices_are_independent() {
    let received = received_tree();
    let output = build(&[RootDescriptor::new("!!MCDR", true)]);

    let mut first = output.splice(&received).unwrap();
    let second = output.splice(&received).unwrap();
    assert_eq!(first, second);

    first.nodes[0].children.clear();
    first.nodes[4].name = Some("!!changed".to_string());

    assert_eq!(second.nodes[0].children, vec![1, 2, 4]);
    assert_eq!(second.nodes[4].name.as_deref(), Some("!!MCDR"));
    assert_eq!(output.roots[0].root.name.as_deref(), Some("!!MCDR"));
}

#[test]
fn test_splice_into_non_zero_root() {
    // Root stored last instead of first
    let mut root = Node::root();
    root.children = vec![0];
    let received = NodeTable::new(vec![Node::literal("seed"), root], 1).unwrap();
    let output = build(&[RootDescriptor::new("!!MCDR", true)]);

    let merged = output.splice(&received).unwrap();
    assert_eq!(merged.nodes[1].children, vec![0, 2]);
    assert!(merged.nodes[0].children.is_empty());
}

#[test]
fn test_splice_rejects_invalid_received_tree() {
    let broken = NodeTable {
        nodes: vec![Node::root()],
        root: 3,
    };
    let output = build(&[RootDescriptor::new("!!MCDR", true)]);

    assert!(output.splice(&broken).unwrap_err().is_format());
}

#[test]
fn test_merged_tree_encodes_and_decodes() {
    let received = received_tree();
    let output = build(&[
        RootDescriptor::new("!!MCDR", true).with_holder(CommandHolder::new(["status", "reload"])),
    ]);
    let merged = output.splice(&received).unwrap();

    let bytes = merged.to_bytes().unwrap();
    let decoded = NodeTable::from_bytes(bytes.clone()).unwrap();
    assert_eq!(decoded, merged);
    assert_eq!(decoded.to_bytes().unwrap(), bytes);
}
