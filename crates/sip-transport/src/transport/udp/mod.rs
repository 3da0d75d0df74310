mod listener;
mod sender;

pub use listener::UdpListener;
pub use sender::UdpSender;

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Network token of this transport
pub const UDP: &str = "UDP";

/// UDP transport for SIP messages
///
/// The listener and sender halves share one socket, so replies leave from
/// the address peers sent to. Clones share the socket and the closed flag.
#[derive(Clone)]
pub struct UdpTransport {
    inner: Arc<UdpTransportInner>,
}

struct UdpTransportInner {
    sender: UdpSender,
    listener: UdpListener,
    closed: AtomicBool,
}

impl UdpTransport {
    /// Creates a new UDP transport bound to the specified address
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = UdpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("SIP UDP transport bound to {}", local_addr);

        let sender = UdpSender::new(listener.clone_socket());

        Ok(UdpTransport {
            inner: Arc::new(UdpTransportInner {
                sender,
                listener,
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Waits for the next datagram, copying it into `buf`
    pub async fn receive(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        if self.is_closed() {
            return Err(Error::TransportClosed);
        }
        self.inner.listener.receive(buf).await
    }

    /// Waits for the next datagram and returns it as owned bytes
    pub async fn receive_datagram(&self, max_size: usize) -> Result<(Bytes, SocketAddr)> {
        let mut buf = vec![0u8; max_size];
        let (len, source) = self.receive(&mut buf).await?;
        buf.truncate(len);
        Ok((Bytes::from(buf), source))
    }
}

#[async_trait]
impl Transport for UdpTransport {
    fn local_addr(&self) -> Result<SocketAddr> {
        self.inner.listener.local_addr()
    }

    fn network(&self) -> &'static str {
        UDP
    }

    async fn send_to(&self, data: Bytes, destination: SocketAddr) -> Result<()> {
        if self.is_closed() {
            return Err(Error::TransportClosed);
        }
        debug!("Sending {} byte message to {}", data.len(), destination);
        self.inner.sender.send(&data, destination).await
    }

    async fn close(&self) -> Result<()> {
        self.inner.closed.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Ok(addr) = self.inner.listener.local_addr() {
            write!(f, "UdpTransport({})", addr)
        } else {
            write!(f, "UdpTransport(<error>)")
        }
    }
}
