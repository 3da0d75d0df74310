//! Call resolution and forwarding

use std::net::SocketAddr;
use std::sync::Arc;

use sipbridge_sip_core::{HeaderName, HeaderValue, Message, Method, Request, Response, StatusCode};
use sipbridge_sip_transport::Transport;
use tracing::{debug, warn};

use crate::connection::Connection;
use crate::error::{RelayError, Result};
use crate::process::{Process, ProcessRegistry, Resolution};
use crate::queue::WorkItem;
use crate::relationship::{Relationship, RelationshipRegistry};
use crate::rewrite::{rewrite_request, rewrite_response, RewriteContext};
use crate::route::{Route, RouteTable};
use crate::stats::RelayStats;

/// Routing state of a relay and the operations on it
///
/// The engine owns the route table and the two registries. It ties inbound
/// messages to calls and forwards rewritten copies to the other party.
#[derive(Debug)]
pub struct RelayEngine {
    transport: Arc<dyn Transport>,
    local_addr: SocketAddr,
    routes: RouteTable,
    relationships: RelationshipRegistry,
    processes: ProcessRegistry,
    stats: Arc<RelayStats>,
}

impl RelayEngine {
    pub fn new(transport: Arc<dyn Transport>, routes: RouteTable, max_processes: Option<usize>) -> Result<Self> {
        let local_addr = transport.local_addr()?;
        Ok(RelayEngine {
            transport,
            local_addr,
            routes,
            relationships: RelationshipRegistry::new(),
            processes: ProcessRegistry::new(max_processes),
            stats: Arc::new(RelayStats::new()),
        })
    }

    pub fn with_stats(mut self, stats: Arc<RelayStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Stamps `addr` into forwarded messages instead of the bound address
    pub fn with_advertised_addr(mut self, addr: SocketAddr) -> Self {
        self.local_addr = addr;
        self
    }

    /// Address peers see for the relay
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn relationships(&self) -> &RelationshipRegistry {
        &self.relationships
    }

    pub fn processes(&self) -> &ProcessRegistry {
        &self.processes
    }

    pub fn stats(&self) -> &Arc<RelayStats> {
        &self.stats
    }

    /// Finds or creates the process for a message received from `source`.
    ///
    /// Known calls reuse their process. A request for a new call is resolved
    /// through the route of its From domain first and a registered
    /// relationship second. Responses never create processes.
    pub fn resolve(&self, message: &mut Message, source: SocketAddr) -> Result<Arc<Process>> {
        let call_id = message.call_id();
        if let Some(process) = self.processes.get(&call_id) {
            return Ok(process);
        }

        let request = match message {
            Message::Request(request) => request,
            Message::Response(_) => return Err(RelayError::UnknownCall(call_id)),
        };

        let caller = Connection::new(source, self.transport.clone());
        match self.find_route(request) {
            Ok(route) => {
                let backend = route
                    .select_backend()
                    .ok_or_else(|| RelayError::RouteNotFound(route.domain().to_string()))?;
                let callee = Connection::new(backend, self.transport.clone());
                let process = self.processes.insert(Process::new(
                    call_id,
                    caller.clone(),
                    callee,
                    Resolution::Route(route.clone()),
                ))?;
                if request.method == Method::Register {
                    self.bind_relationship(request, caller, &route);
                }
                Ok(process)
            }
            Err(route_error) => {
                debug!(call_id = %call_id, error = %route_error, "No route, trying relationships");
                let relationship = self.find_relationship(request)?;
                let callee = relationship.connection.clone();
                self.processes.insert(Process::new(
                    call_id,
                    caller,
                    callee,
                    Resolution::Relationship(relationship),
                ))
            }
        }
    }

    fn find_route(&self, request: &Request) -> Result<Arc<Route>> {
        let from = request
            .headers
            .address(HeaderName::FROM)
            .ok_or_else(|| RelayError::MissingHeader(HeaderName::FROM.to_string()))?;
        self.routes
            .find(&from.uri.host)
            .ok_or_else(|| RelayError::RouteNotFound(from.uri.host.clone()))
    }

    fn find_relationship(&self, request: &Request) -> Result<Arc<Relationship>> {
        let to = request
            .headers
            .address(HeaderName::TO)
            .ok_or_else(|| RelayError::MissingHeader(HeaderName::TO.to_string()))?;
        let contact = request.headers.address(HeaderName::CONTACT);
        self.relationships.lookup(to, contact)
    }

    // Binds the registering user under the route's rewritten domain, if any
    fn bind_relationship(&self, request: &Request, connection: Connection, route: &Route) {
        let Some(from) = request.headers.address(HeaderName::FROM) else {
            return;
        };
        let Some(user) = from.uri.user.as_deref().filter(|u| !u.is_empty()) else {
            debug!("REGISTER without a From user, not binding");
            return;
        };
        let original_domain = from.uri.host.clone();
        let domain = route.rewrite_to().map(str::to_string).unwrap_or_else(|| original_domain.clone());
        self.relationships
            .bind(Relationship::new(user, domain, original_domain, connection));
    }

    /// Rewrites the message of `item` and sends it to the other party.
    ///
    /// A request whose Max-Forwards runs out is answered with 482 to its
    /// sender instead of being forwarded.
    pub async fn forward(&self, item: WorkItem) -> Result<()> {
        let WorkItem {
            message,
            process,
            source,
            ..
        } = item;
        let ctx = RewriteContext::new(self.local_addr, self.transport.network(), source, &process);

        match message {
            Message::Request(request) => {
                let mut rewritten = rewrite_request(&request, &ctx);
                if let Some(hops) = rewritten.headers.max_forwards() {
                    let hops = hops - 1;
                    rewritten
                        .headers
                        .set(HeaderName::MAX_FORWARDS, HeaderValue::MaxForwards(hops));
                    if hops <= 0 {
                        self.stats.record_loop_detected();
                        let loop_detected = RelayError::LoopDetected(process.call_id().to_string());
                        warn!(source = %source, "{}, answering 482", loop_detected);
                        let response = Response::from_request(StatusCode::LOOP_DETECTED, &request);
                        self.transport.send_to(response.to_bytes(), source).await?;
                        return Ok(());
                    }
                }
                process.request_peer(source).send_request(&rewritten).await?;
            }
            Message::Response(response) => {
                let rewritten = rewrite_response(&response, &ctx);
                process.response_peer(source).send_response(&rewritten).await?;
            }
        }

        self.stats.record_forwarded();
        Ok(())
    }

    /// Answers an unresolvable request with 480 Temporarily Unavailable
    pub async fn reject(&self, request: &Request, source: SocketAddr) -> Result<()> {
        let response = Response::from_request(StatusCode::TEMPORARILY_UNAVAILABLE, request);
        self.transport.send_to(response.to_bytes(), source).await?;
        Ok(())
    }
}
