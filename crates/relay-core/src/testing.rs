use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use sipbridge_sip_core::{parse_message, HeaderParserRegistry, Message};
use sipbridge_sip_transport::{Error, Result, Transport};

/// Transport that keeps every datagram it is asked to send
#[derive(Debug)]
pub(crate) struct RecordingTransport {
    local_addr: SocketAddr,
    sent: Mutex<Vec<(Bytes, SocketAddr)>>,
}

impl RecordingTransport {
    pub(crate) fn new(local_addr: &str) -> Self {
        RecordingTransport {
            local_addr: local_addr.parse().unwrap(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn shared(local_addr: &str) -> Arc<dyn Transport> {
        Arc::new(Self::new(local_addr))
    }

    /// Decoded messages sent so far, with their destinations
    pub(crate) fn sent(&self) -> Vec<(Message, SocketAddr)> {
        let registry = HeaderParserRegistry::default();
        self.sent
            .lock()
            .iter()
            .map(|(data, to)| (parse_message(data, &registry).unwrap(), *to))
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.local_addr)
    }

    fn network(&self) -> &'static str {
        "UDP"
    }

    async fn send_to(&self, data: Bytes, destination: SocketAddr) -> Result<()> {
        if destination.port() == 0 {
            return Err(Error::TransportClosed);
        }
        self.sent.lock().push((data, destination));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }
}
