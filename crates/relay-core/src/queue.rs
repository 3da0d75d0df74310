//! Bounded hand-off between the ingress loop and the forwarding loop

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sipbridge_sip_core::Message;
use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{RelayError, Result};
use crate::process::Process;
use crate::stats::RelayStats;

/// A resolved message waiting to be rewritten and forwarded
#[derive(Debug)]
pub struct WorkItem {
    pub message: Message,
    pub process: Arc<Process>,
    /// Address the message arrived from
    pub source: SocketAddr,
    /// Request-scoped token; cancelled items are skipped
    pub context: CancellationToken,
}

impl WorkItem {
    pub fn call_id(&self) -> &str {
        self.process.call_id()
    }
}

/// Producer side of the work queue
///
/// A push waits at most `timeout` for space. When the queue stays full the
/// item is dropped and counted, so ingress never stalls behind forwarding.
#[derive(Debug, Clone)]
pub struct WorkQueue {
    sender: mpsc::Sender<WorkItem>,
    timeout: Duration,
    stats: Arc<RelayStats>,
}

/// Creates a work queue and its receiving end
pub fn work_queue(
    capacity: usize,
    timeout: Duration,
    stats: Arc<RelayStats>,
) -> (WorkQueue, mpsc::Receiver<WorkItem>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (WorkQueue { sender, timeout, stats }, receiver)
}

impl WorkQueue {
    pub async fn push(&self, item: WorkItem) -> Result<()> {
        match self.sender.send_timeout(item, self.timeout).await {
            Ok(()) => {
                self.stats.record_enqueued();
                Ok(())
            }
            Err(SendTimeoutError::Timeout(item)) => {
                self.stats.record_dropped();
                warn!(call_id = %item.call_id(), source = %item.source, "Work queue full, dropping message");
                Err(RelayError::QueueFull)
            }
            Err(SendTimeoutError::Closed(item)) => {
                self.stats.record_dropped();
                warn!(call_id = %item.call_id(), "Work queue closed, dropping message");
                Err(RelayError::QueueClosed)
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::process::Resolution;
    use crate::route::Route;
    use crate::testing::RecordingTransport;
    use sipbridge_sip_core::{Response, StatusCode};
    use tokio::time::Instant;

    fn item(process: &Arc<Process>) -> WorkItem {
        WorkItem {
            message: Message::Response(Response::new(StatusCode::OK)),
            process: process.clone(),
            source: "10.0.0.9:5060".parse().unwrap(),
            context: CancellationToken::new(),
        }
    }

    fn process() -> Arc<Process> {
        let transport = RecordingTransport::shared("127.0.0.1:5060");
        Arc::new(Process::new(
            "c1",
            Connection::new("10.0.0.5:5060".parse().unwrap(), transport.clone()),
            Connection::new("10.0.0.9:5060".parse().unwrap(), transport),
            Resolution::Route(Arc::new(Route::new("a.com", vec!["10.0.0.9:5060".parse().unwrap()]))),
        ))
    }

    #[tokio::test]
    async fn test_overflow_is_dropped() {
        let stats = Arc::new(RelayStats::new());
        let (queue, mut receiver) = work_queue(2, Duration::from_millis(20), stats.clone());
        let process = process();

        let started = Instant::now();
        let mut results = Vec::new();
        for _ in 0..5 {
            results.push(queue.push(item(&process)).await);
        }
        assert!(started.elapsed() < Duration::from_secs(2));

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
        assert!(results[2..].iter().all(|r| matches!(r, Err(RelayError::QueueFull))));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.enqueued, 2);
        assert_eq!(snapshot.dropped, 3);

        // accepted items come out in order
        assert!(receiver.recv().await.is_some());
        assert!(receiver.recv().await.is_some());
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_queue() {
        let stats = Arc::new(RelayStats::new());
        let (queue, receiver) = work_queue(1, Duration::from_millis(20), stats.clone());
        drop(receiver);

        assert!(matches!(queue.push(item(&process())).await, Err(RelayError::QueueClosed)));
        assert_eq!(stats.snapshot().dropped, 1);
    }
}
