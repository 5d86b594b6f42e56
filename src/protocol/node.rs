//! Command tree node graph
//!
//! ## Wire Format (Declare Commands body)
//! ```text
//! ┌──────────────┬────────────────────────────┬──────────────┐
//! │ Count VarInt │ Node * Count               │ Root VarInt  │
//! └──────────────┴────────────────────────────┴──────────────┘
//!
//! Node:
//! ┌─────────┬──────────┬──────────────┬────────────┬────────┬───────────────────┬──────────────┐
//! │ Flags   │ Children │ Child VarInt │ [Redirect] │ [Name] │ [Parser + Props]  │ [Suggestions]│
//! │ VarInt  │ VarInt   │ * Children   │ VarInt     │ String │ VarInt + Variant  │ String       │
//! └─────────┴──────────┴──────────────┴────────────┴────────┴───────────────────┴──────────────┘
//! ```
//!
//! ### Flags
//! - 0x03: node kind (0 root, 1 literal, 2 argument, 3 unused)
//! - 0x04: executable
//! - 0x08: has redirect
//! - 0x10: has suggestions type

use std::fmt;

use bytes::Bytes;

use crate::error::{Result, SpliceError};

use super::buffer::{PacketBuffer, PacketReader};
use super::properties::{parser_name, Properties, PropertyRegistry};

pub const FLAG_KIND_MASK: i32 = 0x03;
pub const FLAG_EXECUTABLE: i32 = 0x04;
pub const FLAG_REDIRECT: i32 = 0x08;
pub const FLAG_SUGGESTIONS: i32 = 0x10;

/// Node kind encoded in the low two flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum NodeKind {
    Root = 0,
    Literal = 1,
    Argument = 2,
}

impl NodeKind {
    pub fn from_flags(flags: i32) -> Result<Self> {
        match flags & FLAG_KIND_MASK {
            0 => Ok(NodeKind::Root),
            1 => Ok(NodeKind::Literal),
            2 => Ok(NodeKind::Argument),
            _ => Err(SpliceError::format(format!(
                "node flags 0x{:02x} use reserved kind 3",
                flags
            ))),
        }
    }
}

/// One vertex of the command tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub flags: i32,
    /// Indices into the owning table; order is what the client displays
    pub children: Vec<usize>,
    pub redirect: Option<usize>,
    pub name: Option<String>,
    pub parser_id: Option<i32>,
    pub properties: Option<Properties>,
    pub suggestions_type: Option<String>,
}

impl Node {
    pub fn root() -> Self {
        Self {
            flags: NodeKind::Root as i32,
            children: Vec::new(),
            redirect: None,
            name: None,
            parser_id: None,
            properties: None,
            suggestions_type: None,
        }
    }

    pub fn literal(name: impl Into<String>) -> Self {
        Self {
            flags: NodeKind::Literal as i32,
            name: Some(name.into()),
            ..Self::root()
        }
    }

    pub fn argument(name: impl Into<String>, parser_id: i32, properties: Option<Properties>) -> Self {
        Self {
            flags: NodeKind::Argument as i32,
            name: Some(name.into()),
            parser_id: Some(parser_id),
            properties,
            ..Self::root()
        }
    }

    /// Mark the node stack ending here as a runnable command
    pub fn executable(mut self, executable: bool) -> Self {
        if executable {
            self.flags |= FLAG_EXECUTABLE;
        } else {
            self.flags &= !FLAG_EXECUTABLE;
        }
        self
    }

    pub fn with_redirect(mut self, target: usize) -> Self {
        self.flags |= FLAG_REDIRECT;
        self.redirect = Some(target);
        self
    }

    pub fn with_suggestions(mut self, suggestions_type: impl Into<String>) -> Self {
        self.flags |= FLAG_SUGGESTIONS;
        self.suggestions_type = Some(suggestions_type.into());
        self
    }

    pub fn kind(&self) -> Result<NodeKind> {
        NodeKind::from_flags(self.flags)
    }

    pub fn is_executable(&self) -> bool {
        self.flags & FLAG_EXECUTABLE != 0
    }

    /// Resolved parser name, if this is an argument with a known parser
    pub fn parser_name(&self) -> Option<&'static str> {
        self.parser_id.and_then(parser_name)
    }

    /// Read one node
    ///
    /// The node is only built once every field has been read, so a failure
    /// never leaves a half-populated node behind.
    pub fn decode(reader: &mut PacketReader, registry: &PropertyRegistry) -> Result<Self> {
        let flags = reader.read_varint()?;
        let kind = NodeKind::from_flags(flags)?;

        let child_count = reader.read_varint_usize("child count")?;
        let mut children = Vec::with_capacity(child_count.min(reader.remaining()));
        for _ in 0..child_count {
            children.push(reader.read_varint_usize("child index")?);
        }

        let redirect = if flags & FLAG_REDIRECT != 0 {
            Some(reader.read_varint_usize("redirect index")?)
        } else {
            None
        };

        let name = match kind {
            NodeKind::Literal | NodeKind::Argument => Some(reader.read_string()?),
            NodeKind::Root => None,
        };

        let (parser_id, properties) = if kind == NodeKind::Argument {
            let parser_id = reader.read_varint()?;
            let properties = registry.decode_properties(parser_id, reader)?;
            (Some(parser_id), properties)
        } else {
            (None, None)
        };

        let suggestions_type = if flags & FLAG_SUGGESTIONS != 0 {
            Some(reader.read_string()?)
        } else {
            None
        };

        Ok(Self {
            flags,
            children,
            redirect,
            name,
            parser_id,
            properties,
            suggestions_type,
        })
    }

    /// Write one node in the same field order `decode` reads it
    pub fn encode(&self, buffer: &mut PacketBuffer, registry: &PropertyRegistry) -> Result<()> {
        let kind = self.kind()?;

        if (self.flags & FLAG_REDIRECT != 0) != self.redirect.is_some() {
            return Err(SpliceError::format(format!(
                "redirect flag disagrees with redirect {:?}",
                self.redirect
            )));
        }
        if (kind != NodeKind::Root) != self.name.is_some() {
            return Err(SpliceError::format(format!(
                "{:?} node with name {:?}",
                kind, self.name
            )));
        }
        if (kind == NodeKind::Argument) != self.parser_id.is_some() {
            return Err(SpliceError::format(format!(
                "{:?} node with parser {:?}",
                kind, self.parser_id
            )));
        }
        if self.parser_id.is_none() && self.properties.is_some() {
            return Err(SpliceError::format("properties without a parser"));
        }
        if (self.flags & FLAG_SUGGESTIONS != 0) != self.suggestions_type.is_some() {
            return Err(SpliceError::format(format!(
                "suggestions flag disagrees with suggestions type {:?}",
                self.suggestions_type
            )));
        }

        buffer.write_varint(self.flags);
        buffer.write_varint_usize(self.children.len());
        for child in &self.children {
            buffer.write_varint_usize(*child);
        }
        if let Some(redirect) = self.redirect {
            buffer.write_varint_usize(redirect);
        }
        if let Some(name) = &self.name {
            buffer.write_string(name);
        }
        if let Some(parser_id) = self.parser_id {
            buffer.write_varint(parser_id);
            registry.encode_properties(parser_id, self.properties.as_ref(), buffer)?;
        }
        if let Some(suggestions_type) = &self.suggestions_type {
            buffer.write_string(suggestions_type);
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Node flags={:#07b} children={:?}", self.flags, self.children)?;
        if let Some(name) = &self.name {
            write!(f, " name={}", name)?;
        }
        if let Some(parser) = self.parser_name() {
            write!(f, " parser={}", parser)?;
        }
        if let Some(properties) = &self.properties {
            write!(f, " properties={:?}", properties)?;
        }
        if let Some(redirect) = self.redirect {
            write!(f, " redirect={}", redirect)?;
        }
        if let Some(suggestions_type) = &self.suggestions_type {
            write!(f, " suggestions_type={}", suggestions_type)?;
        }
        write!(f, ">")
    }
}

// =============================================================================
// Node Table
// =============================================================================

/// All nodes of one Declare Commands packet plus the root index
///
/// Indices are local to the table. `Clone` is a deep copy: nodes are owned
/// values, so a clone shares nothing with the original.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTable {
    pub nodes: Vec<Node>,
    pub root: usize,
}

impl NodeTable {
    pub fn new(nodes: Vec<Node>, root: usize) -> Result<Self> {
        let table = Self { nodes, root };
        table.validate()?;
        Ok(table)
    }

    /// Decode with the standard property registry
    pub fn decode(reader: &mut PacketReader) -> Result<Self> {
        Self::decode_with(reader, PropertyRegistry::standard())
    }

    pub fn decode_with(reader: &mut PacketReader, registry: &PropertyRegistry) -> Result<Self> {
        let count = reader.read_varint_usize("node count")?;
        let mut nodes = Vec::with_capacity(count.min(reader.remaining()));
        for index in 0..count {
            let node = Node::decode(reader, registry).map_err(|e| match e {
                SpliceError::Format(msg) => SpliceError::format(format!("node {}: {}", index, msg)),
                other => other,
            })?;
            nodes.push(node);
        }
        let root = reader.read_varint_usize("root index")?;
        Self::new(nodes, root)
    }

    /// Decode a whole packet body, rejecting trailing bytes
    pub fn from_bytes(body: impl Into<Bytes>) -> Result<Self> {
        let mut reader = PacketReader::new(body);
        let table = Self::decode(&mut reader)?;
        reader.expect_end("declare commands")?;
        Ok(table)
    }

    /// Encode with the standard property registry
    pub fn encode(&self, buffer: &mut PacketBuffer) -> Result<()> {
        self.encode_with(buffer, PropertyRegistry::standard())
    }

    pub fn encode_with(&self, buffer: &mut PacketBuffer, registry: &PropertyRegistry) -> Result<()> {
        self.validate()?;
        buffer.write_varint_usize(self.nodes.len());
        for node in &self.nodes {
            node.encode(buffer, registry)?;
        }
        buffer.write_varint_usize(self.root);
        Ok(())
    }

    /// Encode into a fresh body; nothing is returned unless encoding succeeds
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buffer = PacketBuffer::new();
        self.encode(&mut buffer)?;
        Ok(buffer.freeze())
    }

    /// Every child and redirect index, and the root, must lie inside the table
    pub fn validate(&self) -> Result<()> {
        let len = self.nodes.len();
        if self.root >= len {
            return Err(SpliceError::format(format!(
                "root index {} out of range for {} nodes",
                self.root, len
            )));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(child) = node.children.iter().find(|child| **child >= len) {
                return Err(SpliceError::format(format!(
                    "node {}: child index {} out of range for {} nodes",
                    index, child, len
                )));
            }
            if let Some(redirect) = node.redirect.filter(|target| *target >= len) {
                return Err(SpliceError::format(format!(
                    "node {}: redirect index {} out of range for {} nodes",
                    index, redirect, len
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root_node(&self) -> Option<&Node> {
        self.nodes.get(self.root)
    }

    /// Names of the root's direct children, in order
    pub fn root_literals(&self) -> Vec<&str> {
        self.root_node()
            .map(|root| {
                root.children
                    .iter()
                    .filter_map(|child| self.nodes.get(*child))
                    .filter_map(|node| node.name.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Indented dump of everything reachable from the root
    ///
    /// Redirects are printed as `-> index` and never followed.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut visited = vec![false; self.nodes.len()];
        self.render_node(self.root, 0, &mut visited, &mut out);
        out
    }

    fn render_node(&self, index: usize, depth: usize, visited: &mut [bool], out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        let Some(node) = self.nodes.get(index) else {
            out.push_str(&format!("[{}] <dangling>\n", index));
            return;
        };
        out.push_str(&format!("[{}] {}\n", index, node));
        if visited[index] {
            return;
        }
        visited[index] = true;
        for child in &node.children {
            self.render_node(*child, depth + 1, visited, out);
        }
    }
}
