//! Session
//!
//! Bridge state for a single client connection.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::bridge::Bridge;
use crate::cache::TreeSubscriber;
use crate::error::{Result, SpliceError};
use crate::merge::MergeOutput;
use crate::protocol::{
    encode_declare_commands, encode_set_display_chat_preview, read_leading_text,
    ChatPreviewRequest, CommandSuggestionsRequest, Direction, NodeTable, PacketIds, ServerData,
};
use crate::source::PacketCommandSource;
use crate::translate::{chat_preview, tab_completion};

use super::connection::Connection;
use super::router::{is_escaped, route_suggestion, DispatchTable, PacketKind, Verdict};

/// Handles the intercepted packets of one connection
///
/// The transport calls [`Session::handle_packet`] sequentially for one
/// connection. The only state touched from elsewhere is the received tree,
/// which the cache worker reads when it pushes a refreshed merge.
pub struct Session {
    bridge: Arc<Bridge>,
    conn: Arc<dyn Connection>,
    /// `None` when the connection's version is not handled
    ids: Option<PacketIds>,
    dispatch: DispatchTable,
    /// Last Declare Commands tree from the server, never modified
    received: Mutex<Option<NodeTable>>,
    format_errors: AtomicU32,
    me: Weak<Session>,
}

impl Session {
    /// Set up interception for a freshly logged-in connection
    ///
    /// Connections below the minimum version, or at a version without a
    /// packet id table, register nothing and every packet passes.
    pub fn open(bridge: Arc<Bridge>, conn: Arc<dyn Connection>) -> Result<Arc<Self>> {
        let protocol = conn.protocol_version();
        let config = bridge.config();

        let ids = if protocol < config.min_protocol_version {
            tracing::info!(
                "Connection {} uses protocol {} below {}, not intercepting",
                conn.name(),
                protocol,
                config.min_protocol_version
            );
            None
        } else {
            let ids = bridge.protocols().get(protocol).copied();
            if ids.is_none() {
                tracing::warn!(
                    "No packet ids for protocol {} ({}), not intercepting",
                    protocol,
                    conn.name()
                );
            }
            ids
        };

        let dispatch = match &ids {
            Some(ids) => DispatchTable::build(config, ids),
            None => DispatchTable::empty(),
        };
        tracing::debug!(
            "Session for {} at protocol {}: {} handlers (chat={}, vanilla={}, preview={})",
            conn.name(),
            protocol,
            dispatch.len(),
            config.proxy_mcdr_chat_command,
            config.register_vanilla_command,
            config.chat_preview_suggestion
        );

        let session = Arc::new_cyclic(|me| Session {
            bridge,
            conn,
            ids,
            dispatch,
            received: Mutex::new(None),
            format_errors: AtomicU32::new(0),
            me: me.clone(),
        });

        if session.dispatch.handles(PacketKind::ChatPreview) {
            if let Some(packet_id) = session.ids.and_then(|ids| ids.set_display_chat_preview) {
                session
                    .conn
                    .send_client(encode_set_display_chat_preview(packet_id, true))?;
            }
        }
        if session.dispatch.handles(PacketKind::DeclareCommands) {
            let subscriber: Arc<dyn TreeSubscriber> = session.clone();
            session.bridge.cache().subscribe(&subscriber);
        }

        Ok(session)
    }

    /// Stop receiving tree pushes
    pub fn close(&self) {
        if let Some(me) = self.me.upgrade() {
            let subscriber: Arc<dyn TreeSubscriber> = me;
            self.bridge.cache().unsubscribe(&subscriber);
        }
        tracing::debug!("Session for {} closed", self.conn.name());
    }

    pub fn protocol_version(&self) -> i32 {
        self.conn.protocol_version()
    }

    /// Whether any packet kind is intercepted on this connection
    pub fn is_active(&self) -> bool {
        !self.dispatch.is_empty()
    }

    pub fn dispatch(&self) -> &DispatchTable {
        &self.dispatch
    }

    pub fn format_errors(&self) -> u32 {
        self.format_errors.load(Ordering::Relaxed)
    }

    /// Copy of the last tree received from the server
    pub fn received_tree(&self) -> Option<NodeTable> {
        self.received.lock().clone()
    }

    /// Handle one packet; `body` starts after the packet id
    ///
    /// Malformed packets are cancelled. Once `max_format_errors` of them
    /// have been seen the verdict becomes `Disconnect`, since a corrupt tree
    /// breaks every later completion on the connection.
    pub fn handle_packet(&self, direction: Direction, packet_id: i32, body: Bytes) -> Result<Verdict> {
        let Some(kind) = self.dispatch.lookup(direction, packet_id) else {
            return Ok(Verdict::Pass);
        };
        tracing::trace!("{} packet 0x{:02x} from {}", kind_name(kind), packet_id, self.conn.name());

        let outcome = match kind {
            PacketKind::ChatCommand | PacketKind::ChatMessage => self.handle_text(body),
            PacketKind::CommandSuggestionsRequest => self.handle_suggestions_request(body),
            PacketKind::ChatPreview => self.handle_chat_preview(body),
            PacketKind::DeclareCommands => self.handle_declare_commands(body),
            PacketKind::ServerData => self.handle_server_data(body),
        };

        match outcome {
            Err(e) if e.is_format() => {
                let count = self.format_errors.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    "Malformed {} packet from {} ({} so far): {}",
                    kind_name(kind),
                    self.conn.name(),
                    count,
                    e
                );
                if count >= self.bridge.config().max_format_errors {
                    Ok(Verdict::Disconnect)
                } else {
                    Ok(Verdict::Cancel)
                }
            }
            other => other,
        }
    }

    fn ids(&self) -> Result<&PacketIds> {
        self.ids
            .as_ref()
            .ok_or_else(|| SpliceError::Network("session has no packet ids".to_string()))
    }

    fn source(&self, text: &str) -> PacketCommandSource {
        PacketCommandSource::new(self.conn.name(), text)
    }

    fn handle_text(&self, body: Bytes) -> Result<Verdict> {
        let text = read_leading_text(body)?;
        let config = self.bridge.config();
        if !is_escaped(&text, &config.escape_prefix) {
            return Ok(Verdict::Pass);
        }

        tracing::info!("{} issued external command: {}", self.conn.name(), text);
        let source = self.source(&text);
        if let Err(e) = self.bridge.executor().execute(&text, &source) {
            tracing::debug!("Executor rejected {:?} from {}: {}", text, source, e);
        }
        Ok(Verdict::Cancel)
    }

    fn handle_suggestions_request(&self, body: Bytes) -> Result<Verdict> {
        let request = CommandSuggestionsRequest::decode(body)?;
        let config = self.bridge.config();
        let Some((prefix_adjustment, text)) = route_suggestion(&request.text, &config.escape_prefix)
        else {
            return Ok(Verdict::Pass);
        };

        let source = self.source(text);
        let suggestions = self.bridge.suggester().suggest(text, &source);
        let response = tab_completion(request.transaction_id, text, prefix_adjustment, &suggestions);

        let packet_id = self.ids()?.command_suggestions_response;
        self.conn.send_client(response.encode(packet_id))?;
        Ok(Verdict::Cancel)
    }

    fn handle_chat_preview(&self, body: Bytes) -> Result<Verdict> {
        let ids = self.ids()?;
        let request = ChatPreviewRequest::decode(body)?;
        let config = self.bridge.config();

        let suggestions = if is_escaped(&request.text, &config.escape_prefix) {
            let source = self.source(&request.text);
            Some(self.bridge.suggester().suggest(&format!("{} ", request.text), &source))
        } else {
            None
        };
        let reply = chat_preview(request.query_id, suggestions.as_deref());

        let ack_id = ids
            .chat_preview_response
            .ok_or_else(|| SpliceError::Network("protocol has no chat preview".to_string()))?;
        self.conn.send_client(reply.ack.encode(ack_id))?;
        self.conn
            .send_client(reply.suggestions.encode(ids.chat_suggestions))?;
        Ok(Verdict::Cancel)
    }

    fn handle_declare_commands(&self, body: Bytes) -> Result<Verdict> {
        let table = NodeTable::from_bytes(body)?;
        let protocol = self.protocol_version();

        let mut received = self.received.lock();
        *received = Some(table);

        match self.bridge.cache().lookup(protocol) {
            Ok(output) => {
                if let Some(table) = received.as_ref() {
                    self.send_merged(table, &output)?;
                }
            }
            Err(SpliceError::RegistryUnavailable { .. }) => {
                tracing::debug!(
                    "Tree for protocol {} not built yet, {} gets it on rebuild",
                    protocol,
                    self.conn.name()
                );
            }
            Err(e) => return Err(e),
        }
        Ok(Verdict::Cancel)
    }

    fn handle_server_data(&self, body: Bytes) -> Result<Verdict> {
        let mut data = ServerData::decode(body)?;
        data.previews_chat = true;
        let packet_id = self.ids()?.server_data;
        self.conn.send_client(data.encode(packet_id))?;
        Ok(Verdict::Cancel)
    }

    /// Splice a private copy of `received` and send it
    fn send_merged(&self, received: &NodeTable, output: &MergeOutput) -> Result<()> {
        let merged = output.splice(received)?;
        let packet = encode_declare_commands(self.ids()?.declare_commands, &merged)?;
        tracing::debug!(
            "Sending merged tree to {}: {} + {} nodes",
            self.conn.name(),
            received.len(),
            output.node_count()
        );
        self.conn.send_client(packet)
    }
}

impl TreeSubscriber for Session {
    fn protocol_version(&self) -> i32 {
        self.conn.protocol_version()
    }

    fn refresh_tree(&self, output: &Arc<MergeOutput>) -> Result<()> {
        // Held across the send so a push and a fresh Declare Commands
        // cannot reach the client out of order.
        let received = self.received.lock();
        match received.as_ref() {
            Some(table) => self.send_merged(table, output),
            None => Ok(()),
        }
    }
}

fn kind_name(kind: PacketKind) -> &'static str {
    match kind {
        PacketKind::ChatCommand => "chat command",
        PacketKind::ChatMessage => "chat message",
        PacketKind::CommandSuggestionsRequest => "command suggestions",
        PacketKind::ChatPreview => "chat preview",
        PacketKind::DeclareCommands => "declare commands",
        PacketKind::ServerData => "server data",
    }
}
