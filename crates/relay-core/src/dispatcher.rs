//! Datagram ingress and the forwarding loop

use std::net::SocketAddr;
use std::sync::Arc;

use sipbridge_sip_core::{parse_message, HeaderParserRegistry, Message};
use sipbridge_sip_transport::{Transport, UdpTransport};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::engine::RelayEngine;
use crate::error::Result;
use crate::queue::{work_queue, WorkItem, WorkQueue};
use crate::route::RouteTable;
use crate::stats::RelayStats;

// Shortest datagram worth decoding
const MIN_DATAGRAM_LEN: usize = 3;

/// A running relay: one UDP socket, one ingress loop and one forwarding loop
pub struct Dispatcher {
    config: RelayConfig,
    transport: UdpTransport,
    engine: Arc<RelayEngine>,
    registry: Arc<HeaderParserRegistry>,
    stats: Arc<RelayStats>,
    cancel: CancellationToken,
}

impl Dispatcher {
    /// Validates `config` and binds the listening socket
    pub async fn bind(config: RelayConfig) -> Result<Self> {
        config.validate()?;
        let transport = UdpTransport::bind(config.listen_addr()?).await?;
        Self::with_transport(config, transport)
    }

    /// Builds a relay on an already bound transport
    pub fn with_transport(config: RelayConfig, transport: UdpTransport) -> Result<Self> {
        let routes = RouteTable::from_config(&config.routes)?;
        let stats = Arc::new(RelayStats::new());
        let mut engine = RelayEngine::new(Arc::new(transport.clone()), routes, config.max_processes)?
            .with_stats(stats.clone());
        match config.advertised_addr()? {
            Some(addr) => engine = engine.with_advertised_addr(addr),
            None if engine.local_addr().ip().is_unspecified() => {
                warn!(
                    local_addr = %engine.local_addr(),
                    "Listening on a wildcard address without advertised_addr; peers will see it in Via and Contact"
                );
            }
            None => {}
        }

        Ok(Dispatcher {
            config,
            transport,
            engine: Arc::new(engine),
            registry: Arc::new(HeaderParserRegistry::default()),
            stats,
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the header parser registry used to decode datagrams
    pub fn with_registry(mut self, registry: HeaderParserRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Runs the relay under `token` instead of a private one
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.transport.local_addr()?)
    }

    pub fn engine(&self) -> Arc<RelayEngine> {
        self.engine.clone()
    }

    pub fn stats(&self) -> Arc<RelayStats> {
        self.stats.clone()
    }

    /// Token that stops the relay when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs until the cancellation token fires.
    ///
    /// Per-datagram failures are logged and never stop the loop.
    pub async fn run(self) -> Result<()> {
        let (queue, receiver) = work_queue(self.config.queue_capacity, self.config.enqueue_timeout(), self.stats.clone());
        let consumer = tokio::spawn(forward_loop(self.engine.clone(), receiver, self.cancel.clone()));

        info!(listen = %self.local_addr()?, routes = self.engine.routes().len(), "Relay started");

        let mut buf = vec![0u8; self.config.receive_buffer_size];
        loop {
            let received = tokio::select! {
                _ = self.cancel.cancelled() => break,
                received = self.transport.receive(&mut buf) => received,
            };
            match received {
                Ok((len, source)) => self.handle_datagram(&buf[..len], source, &queue).await,
                Err(sipbridge_sip_transport::Error::TransportClosed) => break,
                Err(e) => warn!(error = %e, "Failed to receive datagram"),
            }
        }

        drop(queue);
        if let Err(e) = consumer.await {
            error!(error = %e, "Forwarding loop panicked");
        }
        self.transport.close().await?;
        info!(stats = ?self.stats.snapshot(), "Relay stopped");
        Ok(())
    }

    async fn handle_datagram(&self, data: &[u8], source: SocketAddr, queue: &WorkQueue) {
        self.stats.record_received();
        if data.len() < MIN_DATAGRAM_LEN {
            debug!(source = %source, len = data.len(), "Ignoring short datagram");
            return;
        }

        let mut message = match parse_message(data, &self.registry) {
            Ok(message) => message,
            Err(e) => {
                self.stats.record_decode_error();
                warn!(source = %source, error = %e, "Failed to decode SIP message");
                return;
            }
        };

        let context = self.cancel.child_token();
        if let Message::Request(request) = &mut message {
            request.source = Some(source);
            request.context = Some(context.clone());
        }

        let process = match self.engine.resolve(&mut message, source) {
            Ok(process) => process,
            Err(e) => {
                self.stats.record_unresolved();
                let call_id = message.call_id();
                warn!(call_id = %call_id, source = %source, error = %e, "Failed to resolve process");
                if let Message::Request(request) = &message {
                    if let Err(e) = self.engine.reject(request, source).await {
                        warn!(source = %source, error = %e, "Failed to send rejection");
                    }
                }
                return;
            }
        };

        debug!(call_id = %process.call_id(), source = %source, "Received {}", message_kind(&message));
        process.push(message.clone());

        let item = WorkItem {
            message,
            process,
            source,
            context,
        };
        // drops are counted and logged by the queue
        let _ = queue.push(item).await;
    }
}

fn message_kind(message: &Message) -> String {
    match message {
        Message::Request(request) => request.method.to_string(),
        Message::Response(response) => response.status.to_string(),
    }
}

async fn forward_loop(engine: Arc<RelayEngine>, mut receiver: mpsc::Receiver<WorkItem>, cancel: CancellationToken) {
    loop {
        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            item = receiver.recv() => match item {
                Some(item) => item,
                None => break,
            },
        };

        if item.context.is_cancelled() {
            debug!(call_id = %item.call_id(), "Skipping cancelled message");
            continue;
        }

        let call_id = item.call_id().to_string();
        if let Err(e) = engine.forward(item).await {
            engine.stats().record_forward_error();
            warn!(call_id = %call_id, error = %e, "Failed to forward message");
        }
    }
    debug!("Forwarding loop stopped");
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("transport", &self.transport)
            .field("routes", &self.engine.routes().len())
            .finish()
    }
}
