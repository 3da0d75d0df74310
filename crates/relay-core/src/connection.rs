use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use sipbridge_sip_core::{Request, Response};
use sipbridge_sip_transport::Transport;
use tracing::debug;

use crate::error::Result;

/// A peer reachable through a shared transport
///
/// Connections are cheap handles: the caller and callee of every call share
/// the relay's listening socket and differ only in the peer address.
#[derive(Clone)]
pub struct Connection {
    addr: SocketAddr,
    transport: Arc<dyn Transport>,
}

impl Connection {
    pub fn new(addr: SocketAddr, transport: Arc<dyn Transport>) -> Self {
        Connection { addr, transport }
    }

    /// Address of the peer
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub async fn send_request(&self, request: &Request) -> Result<()> {
        debug!(peer = %self.addr, method = %request.method, "Forwarding request");
        self.transport.send_to(request.to_bytes(), self.addr).await?;
        Ok(())
    }

    pub async fn send_response(&self, response: &Response) -> Result<()> {
        debug!(peer = %self.addr, status = %response.status, "Forwarding response");
        self.transport.send_to(response.to_bytes(), self.addr).await?;
        Ok(())
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connection({}/{})", self.transport.network(), self.addr)
    }
}
