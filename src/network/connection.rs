//! Connection seam
//!
//! The transport owns framing and sockets; the bridge only needs to know
//! who is on the other end and how to push a packet to the client.

use bytes::Bytes;

use crate::error::Result;

/// One proxied client connection, as the transport exposes it
///
/// Packets from one connection are delivered to the bridge one at a time;
/// different connections may be served concurrently.
pub trait Connection: Send + Sync {
    /// Player name, used to build command sources
    fn name(&self) -> &str;

    /// Protocol version negotiated at login; fixed for the connection
    fn protocol_version(&self) -> i32;

    /// Send a complete packet (id + body) to the client
    fn send_client(&self, packet: Bytes) -> Result<()>;
}
