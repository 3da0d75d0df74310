use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::trace;

use crate::error::{Error, Result};

// Maximum UDP payload size
pub(crate) const MAX_UDP_PACKET_SIZE: usize = 65_507;

/// Sending half of a UDP transport
#[derive(Debug, Clone)]
pub struct UdpSender {
    socket: Arc<UdpSocket>,
}

impl UdpSender {
    pub fn new(socket: Arc<UdpSocket>) -> Self {
        UdpSender { socket }
    }

    /// Sends one datagram to `destination`
    pub async fn send(&self, data: &[u8], destination: SocketAddr) -> Result<()> {
        if data.len() > MAX_UDP_PACKET_SIZE {
            return Err(Error::PacketTooLarge(data.len(), MAX_UDP_PACKET_SIZE));
        }
        self.socket
            .send_to(data, destination)
            .await
            .map_err(|e| Error::SendFailed(destination, e))?;
        trace!(%destination, len = data.len(), "Sent datagram");
        Ok(())
    }
}
