//! Command tree merge engine
//!
//! ## Responsibilities
//! - Build synthetic nodes for the external registry's root commands
//!   (once per protocol version, independent of any connection)
//! - Splice them under the root of one connection's received tree
//!
//! ## Synthetic shape
//! ```text
//! root (received)
//!  └── "!!name"   literal, executable
//!       ├── "args..."  argument, brigadier:string greedy, ask_server
//!       ├── "child1"   literal, executable
//!       └── "child2"   literal, executable
//! ```
//! Node indices are local to one packet, so splicing always happens per
//! connection on a private copy of the received table.

use crate::error::{Result, SpliceError};
use crate::protocol::{parser_id, Node, NodeTable, Properties, StringKind, PARSER_STRING};
use crate::registry::RootDescriptor;

/// Name of the catch-all argument under every synthetic root
pub const ARGS_NODE_NAME: &str = "args...";

/// Suggestions type telling the client to ask the server for completions
pub const ASK_SERVER: &str = "minecraft:ask_server";

/// One synthetic root and the nodes to link directly under it
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticRoot {
    pub root: Node,
    pub children: Vec<Node>,
}

/// Pre-built synthetic fragments for one protocol version
///
/// Never mutated after construction; a registry change builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutput {
    pub protocol: i32,
    pub roots: Vec<SyntheticRoot>,
}

impl MergeOutput {
    /// Output that adds nothing
    pub fn empty(protocol: i32) -> Self {
        Self {
            protocol,
            roots: Vec::new(),
        }
    }

    /// Build synthetic roots from a registry snapshot
    ///
    /// Roots that do not start with `escape_prefix` are skipped, since the
    /// router would never send their text to the external engine. Repeated
    /// names are built once.
    pub fn build(protocol: i32, descriptors: &[RootDescriptor], escape_prefix: &str) -> Result<Self> {
        let string_parser = parser_id(PARSER_STRING)
            .ok_or_else(|| SpliceError::format(format!("parser {} missing", PARSER_STRING)))?;

        let mut roots: Vec<SyntheticRoot> = Vec::with_capacity(descriptors.len());
        let mut seen: Vec<&str> = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            if !descriptor.name.starts_with(escape_prefix) {
                tracing::debug!(
                    "Skipping root {:?}: not behind escape prefix {:?}",
                    descriptor.name,
                    escape_prefix
                );
                continue;
            }
            if seen.contains(&descriptor.name.as_str()) {
                continue;
            }
            seen.push(descriptor.name.as_str());
            roots.push(build_root(descriptor, string_parser));
        }

        tracing::debug!("Built {} synthetic roots for protocol {}", roots.len(), protocol);
        Ok(Self { protocol, roots })
    }

    /// Splice into a private deep copy of `received`
    ///
    /// `received` itself is left untouched so it can be re-spliced when a
    /// newer output is published.
    pub fn splice(&self, received: &NodeTable) -> Result<NodeTable> {
        let mut table = received.clone();
        self.splice_into(&mut table)?;
        Ok(table)
    }

    /// Append every synthetic node to `table` and link it in
    pub fn splice_into(&self, table: &mut NodeTable) -> Result<()> {
        table.validate()?;
        let root = table.root;

        for synthetic in &self.roots {
            let root_index = table.nodes.len();
            table.nodes.push(detached(&synthetic.root));
            table.nodes[root].children.push(root_index);

            for child in &synthetic.children {
                let child_index = table.nodes.len();
                table.nodes.push(detached(child));
                table.nodes[root_index].children.push(child_index);
            }
        }
        Ok(())
    }

    /// Number of nodes `splice` appends
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(|r| 1 + r.children.len()).sum()
    }
}

fn build_root(descriptor: &RootDescriptor, string_parser: i32) -> SyntheticRoot {
    let root = Node::literal(descriptor.name.clone()).executable(true);

    let mut children = Vec::with_capacity(1 + descriptor.holders.len());
    children.push(
        Node::argument(
            ARGS_NODE_NAME,
            string_parser,
            Some(Properties::String(StringKind::GreedyPhrase)),
        )
        .executable(true)
        .with_suggestions(ASK_SERVER),
    );
    // One distinct node per declared child.
    for name in descriptor.declared_children() {
        children.push(Node::literal(name).executable(true));
    }

    SyntheticRoot { root, children }
}

/// Copy of a synthetic node with no links; links are table-local
fn detached(node: &Node) -> Node {
    let mut node = node.clone();
    node.children.clear();
    node
}
