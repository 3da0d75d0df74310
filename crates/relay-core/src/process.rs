//! Per-call state

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use sipbridge_sip_core::Message;
use tracing::debug;

use crate::connection::Connection;
use crate::error::{RelayError, Result};
use crate::relationship::Relationship;
use crate::rewrite::DomainRewrite;
use crate::route::Route;

/// What tied a call to its callee
#[derive(Debug, Clone)]
pub enum Resolution {
    Route(Arc<Route>),
    Relationship(Arc<Relationship>),
}

impl Resolution {
    pub fn domain_rewrite(&self) -> Option<DomainRewrite> {
        match self {
            Resolution::Route(route) => route.domain_rewrite(),
            Resolution::Relationship(relationship) => relationship.domain_rewrite(),
        }
    }
}

#[derive(Debug)]
struct History {
    messages: Vec<Message>,
    updated_at: DateTime<Utc>,
}

/// The relay's state for one call
#[derive(Debug)]
pub struct Process {
    call_id: String,
    caller: Connection,
    callee: Connection,
    resolution: Resolution,
    created_at: DateTime<Utc>,
    history: Mutex<History>,
}

impl Process {
    pub fn new(call_id: impl Into<String>, caller: Connection, callee: Connection, resolution: Resolution) -> Self {
        let now = Utc::now();
        Process {
            call_id: call_id.into(),
            caller,
            callee,
            resolution,
            created_at: now,
            history: Mutex::new(History {
                messages: Vec::new(),
                updated_at: now,
            }),
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    /// Peer that sent the first request of the call
    pub fn caller(&self) -> &Connection {
        &self.caller
    }

    /// Peer the first request was resolved to
    pub fn callee(&self) -> &Connection {
        &self.callee
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn domain_rewrite(&self) -> Option<DomainRewrite> {
        self.resolution.domain_rewrite()
    }

    /// Where a request from `source` is forwarded
    pub fn request_peer(&self, source: SocketAddr) -> &Connection {
        if source == self.caller.addr() {
            &self.callee
        } else {
            &self.caller
        }
    }

    /// Where a response from `source` is forwarded
    pub fn response_peer(&self, source: SocketAddr) -> &Connection {
        if source == self.callee.addr() {
            &self.caller
        } else {
            &self.callee
        }
    }

    /// Appends a message to the call log
    pub fn push(&self, message: Message) {
        let mut history = self.history.lock();
        history.updated_at = Utc::now();
        history.messages.push(message);
    }

    pub fn messages(&self) -> Vec<Message> {
        self.history.lock().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.history.lock().messages.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.history.lock().updated_at
    }
}

/// Shared map of call identity to [`Process`]
///
/// Processes are never removed. `max_processes` caps how many calls are
/// tracked; once reached, new calls are refused.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    processes: RwLock<HashMap<String, Arc<Process>>>,
    max_processes: Option<usize>,
}

impl ProcessRegistry {
    pub fn new(max_processes: Option<usize>) -> Self {
        ProcessRegistry {
            processes: RwLock::new(HashMap::new()),
            max_processes,
        }
    }

    pub fn get(&self, call_id: &str) -> Option<Arc<Process>> {
        self.processes.read().get(call_id).cloned()
    }

    /// Stores a new process.
    ///
    /// If a process already exists for the same call it is returned instead.
    pub fn insert(&self, process: Process) -> Result<Arc<Process>> {
        let mut processes = self.processes.write();
        if let Some(existing) = processes.get(process.call_id()) {
            return Ok(existing.clone());
        }
        if let Some(max) = self.max_processes {
            if processes.len() >= max {
                return Err(RelayError::CapacityExceeded(max));
            }
        }

        let process = Arc::new(process);
        debug!(
            call_id = %process.call_id(),
            caller = %process.caller().addr(),
            callee = %process.callee().addr(),
            "Created process"
        );
        processes.insert(process.call_id().to_string(), process.clone());
        Ok(process)
    }

    pub fn len(&self) -> usize {
        self.processes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.read().is_empty()
    }

    pub fn max_processes(&self) -> Option<usize> {
        self.max_processes
    }
}
