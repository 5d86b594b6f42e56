//! Network Module
//!
//! Per-connection packet interception.
//!
//! ## Architecture
//! - `Connection`: the transport's view of one client
//! - `DispatchTable`: packet id → handler kind, fixed at connection open
//! - `Session`: runs the handlers and owns the received command tree
//!
//! ## Routing
//! - Chat command / chat message: escape-prefixed text goes to the
//!   executor and the packet is cancelled, anything else passes
//! - Suggestions request: `/` + prefix or prefix is answered locally
//! - Declare commands: always cancelled and replaced by the merged tree

mod connection;
mod router;
mod session;

pub use connection::Connection;
pub use router::{is_escaped, route_suggestion, DispatchTable, PacketKind, Verdict};
pub use session::Session;
