//! Header rewriting for forwarded messages
//!
//! Every function here works on a clone of the inbound message; the
//! original stays untouched so it can be kept in the call log and used to
//! build error responses.

use std::net::SocketAddr;

use sipbridge_sip_core::{HeaderName, Headers, Request, Response, Uri, Via};

use crate::process::Process;

/// Domain substitution between an original and a rewritten domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRewrite {
    pub original: String,
    pub rewritten: String,
}

impl DomainRewrite {
    pub fn new(original: impl Into<String>, rewritten: impl Into<String>) -> Self {
        DomainRewrite {
            original: original.into(),
            rewritten: rewritten.into(),
        }
    }

    /// Maps the host of `uri` across the rewrite.
    ///
    /// The original domain becomes the rewritten one (dropping any port),
    /// and the rewritten domain maps back to the original. Returns `true`
    /// if the host changed.
    pub fn apply(&self, uri: &mut Uri) -> bool {
        if uri.host.eq_ignore_ascii_case(&self.original) {
            uri.host = self.rewritten.clone();
            uri.port = None;
            true
        } else if uri.host.eq_ignore_ascii_case(&self.rewritten) {
            uri.host = self.original.clone();
            true
        } else {
            false
        }
    }
}

/// Addressing facts needed to rewrite one message
#[derive(Debug, Clone)]
pub struct RewriteContext {
    /// Address the relay is reachable on
    pub local_addr: SocketAddr,
    /// Transport token of the relay, e.g. `UDP`
    pub network: String,
    /// Address the message arrived from
    pub source: SocketAddr,
    pub caller: SocketAddr,
    pub callee: SocketAddr,
    pub domain_rewrite: Option<DomainRewrite>,
}

impl RewriteContext {
    pub fn new(local_addr: SocketAddr, network: impl Into<String>, source: SocketAddr, process: &Process) -> Self {
        RewriteContext {
            local_addr,
            network: network.into(),
            source,
            caller: process.caller().addr(),
            callee: process.callee().addr(),
            domain_rewrite: process.domain_rewrite(),
        }
    }

    /// The call party that did not send this message
    pub fn remote_party(&self) -> SocketAddr {
        if self.source == self.caller {
            self.callee
        } else {
            self.caller
        }
    }

    /// Where a response from the source is delivered
    pub fn response_destination(&self) -> SocketAddr {
        if self.source == self.callee {
            self.caller
        } else {
            self.callee
        }
    }
}

/// Produces the copy of `original` sent on to the remote party
pub fn rewrite_request(original: &Request, ctx: &RewriteContext) -> Request {
    let mut request = original.clone();

    if request.uri.points_to(&ctx.local_addr) {
        retarget(&mut request.uri, ctx.remote_party());
    }

    if let Some(via) = original.headers.via() {
        let mut hop = Via::for_socket_addr(ctx.network.clone(), ctx.local_addr);
        hop.uri.params = via.uri.params.clone();
        hop.set_rport(via.uri.port);
        request.headers.set(HeaderName::VIA, hop);
    }

    rewrite_contact(&mut request.headers, ctx);
    rewrite_party(&mut request.headers, HeaderName::FROM, ctx);
    rewrite_party(&mut request.headers, HeaderName::TO, ctx);
    request
}

/// Produces the copy of `original` sent on to the response destination
pub fn rewrite_response(original: &Response, ctx: &RewriteContext) -> Response {
    let mut response = original.clone();

    if let Some(via) = original.headers.via() {
        let destination = ctx.response_destination();
        let mut hop = Via::for_socket_addr(ctx.network.clone(), destination);
        if let Some(branch) = via.branch() {
            hop.set_branch(branch);
        }
        hop.set_rport(Some(destination.port()));
        response.headers.set(HeaderName::VIA, hop);
    }

    rewrite_contact(&mut response.headers, ctx);
    rewrite_party(&mut response.headers, HeaderName::FROM, ctx);
    rewrite_party(&mut response.headers, HeaderName::TO, ctx);
    response
}

// Contact points at the relay so in-dialog requests come back through it
fn rewrite_contact(headers: &mut Headers, ctx: &RewriteContext) {
    if let Some(contact) = headers.address_mut(HeaderName::CONTACT) {
        let mut uri = Uri::from_socket_addr(ctx.local_addr).enable_scheme();
        uri.user = contact.uri.user.clone();
        uri.params.set("transport", ctx.network.clone());
        contact.uri = uri;
    }
}

fn rewrite_party(headers: &mut Headers, name: HeaderName, ctx: &RewriteContext) {
    if let Some(party) = headers.address_mut(name) {
        party.uri.params.set("transport", ctx.network.clone());
        if let Some(rewrite) = &ctx.domain_rewrite {
            rewrite.apply(&mut party.uri);
        }
        if party.uri.points_to(&ctx.local_addr) {
            retarget(&mut party.uri, ctx.remote_party());
        }
    }
}

fn retarget(uri: &mut Uri, addr: SocketAddr) {
    let target = Uri::from_socket_addr(addr);
    uri.host = target.host;
    uri.port = target.port;
}
