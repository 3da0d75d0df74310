use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::trace;

use crate::error::{Error, Result};

/// Receiving half of a UDP transport
#[derive(Debug, Clone)]
pub struct UdpListener {
    socket: Arc<UdpSocket>,
}

impl UdpListener {
    /// Binds a new socket to `addr`
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await.map_err(|e| Error::BindFailed(addr, e))?;
        Ok(UdpListener {
            socket: Arc::new(socket),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Error::from)
    }

    /// Shares the underlying socket with a sender
    pub fn clone_socket(&self) -> Arc<UdpSocket> {
        self.socket.clone()
    }

    /// Waits for one datagram and copies it into `buf`.
    ///
    /// Datagrams larger than `buf` are truncated by the socket.
    pub async fn receive(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        let (len, source) = self.socket.recv_from(buf).await.map_err(Error::ReceiveFailed)?;
        trace!(%source, len, "Received datagram");
        Ok((len, source))
    }
}
