pub mod udp;

use std::fmt;
use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::Bytes;

use sipbridge_sip_core::Message;

use crate::error::Result;

/// A connection-less SIP transport
///
/// Implementations send serialized messages to a peer address. The relay
/// holds transports behind `Arc<dyn Transport>` so connections to callers and
/// callees can share the listening socket.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Address the transport is bound to
    fn local_addr(&self) -> Result<SocketAddr>;

    /// Transport token used in `Via` and `transport=` parameters
    fn network(&self) -> &'static str;

    /// Sends raw bytes to `destination`
    async fn send_to(&self, data: Bytes, destination: SocketAddr) -> Result<()>;

    /// Serializes `message` and sends it to `destination`
    async fn send_message(&self, message: &Message, destination: SocketAddr) -> Result<()> {
        self.send_to(message.to_bytes(), destination).await
    }

    /// Stops the transport; later sends fail with `TransportClosed`
    async fn close(&self) -> Result<()>;

    fn is_closed(&self) -> bool;
}
