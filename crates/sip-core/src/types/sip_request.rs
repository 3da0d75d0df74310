//! # SIP Request
//!
//! A request is a method, a target URI, a protocol version, an ordered set of
//! headers and an optional body. Requests decoded off the wire additionally
//! remember the socket address they came from and may carry a cancellation
//! token scoping the work done on their behalf.
//!
//! ## Examples
//!
//! ```rust
//! use sipbridge_sip_core::types::method::Method;
//! use sipbridge_sip_core::types::sip_request::Request;
//! use sipbridge_sip_core::types::headers::HeaderName;
//!
//! let mut request = Request::with_defaults(Method::Options, "example.com");
//! assert_eq!(request.headers.max_forwards(), Some(70));
//!
//! // The first read of the call identity generates and stores one
//! let call_id = request.call_id();
//! assert_eq!(request.call_id(), call_id);
//! assert_eq!(request.headers.call_id(), Some(call_id.as_str()));
//!
//! let wire = request.to_string();
//! assert!(wire.starts_with("OPTIONS sip:example.com SIP/2.0\r\n"));
//! assert!(wire.ends_with("Content-Length: 0\r\n\r\n"));
//! ```

use std::fmt;
use std::net::SocketAddr;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::types::headers::{HeaderName, HeaderValue, Headers};
use crate::types::method::Method;
use crate::types::uri::Uri;

/// Protocol label written on start lines
pub const SIP_VERSION: &str = "SIP/2.0";

/// A SIP request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Request target
    pub uri: Uri,
    /// Protocol version label, `SIP/2.0`
    pub version: String,
    pub headers: Headers,
    pub body: Bytes,
    /// Address the request was received from
    pub source: Option<SocketAddr>,
    /// Scope for work done on behalf of this request
    pub context: Option<CancellationToken>,
}

impl Request {
    /// Creates a request with no headers and an empty body
    pub fn new(method: Method, uri: Uri) -> Self {
        Request {
            method,
            uri,
            version: SIP_VERSION.to_string(),
            headers: Headers::new(),
            body: Bytes::new(),
            source: None,
            context: None,
        }
    }

    /// Creates a request to `domain` carrying the capability headers a user
    /// agent normally advertises and `Max-Forwards: 70`.
    pub fn with_defaults(method: Method, domain: &str) -> Self {
        let (uri, _) = Uri::parse_lenient(domain);
        let mut request = Request::new(method, uri.enable_scheme());
        request.headers.set(
            HeaderName::ALLOW,
            HeaderValue::list([
                "INVITE", "ACK", "CANCEL", "BYE", "NOTIFY", "REFER", "MESSAGE", "OPTIONS", "INFO", "SUBSCRIBE",
            ]),
        );
        request.headers.set(
            HeaderName::SUPPORTED,
            HeaderValue::list([
                "replaces",
                "norefersub",
                "extended-refer",
                "timer",
                "outbound",
                "path",
                "X-cisco-serviceuri",
            ]),
        );
        request
            .headers
            .set(HeaderName::ALLOW_EVENTS, HeaderValue::list(["presence", "kpml"]));
        request.headers.set(HeaderName::MAX_FORWARDS, HeaderValue::MaxForwards(70));
        request
    }

    pub fn with_header(mut self, name: impl Into<HeaderName>, value: impl Into<HeaderValue>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_source(mut self, source: SocketAddr) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_context(mut self, context: CancellationToken) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns the call identity, generating and storing a fresh one when
    /// the request has no `Call-ID` header.
    pub fn call_id(&mut self) -> String {
        if let Some(call_id) = self.headers.call_id() {
            return call_id.to_string();
        }
        let call_id = Uuid::new_v4().to_string();
        self.headers.set(HeaderName::CALL_ID, HeaderValue::text(call_id.clone()));
        call_id
    }

    /// Returns `true` once the request context has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.context.as_ref().map_or(false, |token| token.is_cancelled())
    }

    /// Serializes the request with a freshly computed `Content-Length`
    pub fn to_bytes(&self) -> Bytes {
        let mut out = String::with_capacity(256 + self.body.len());
        out.push_str(&self.start_line());
        self.headers.write_with_content_length(&mut out, self.body.len());
        let mut buf = out.into_bytes();
        buf.extend_from_slice(&self.body);
        Bytes::from(buf)
    }

    fn start_line(&self) -> String {
        let scheme = if self.uri.has_scheme { "" } else { "sip:" };
        format!("{} {}{} {}\r\n", self.method, scheme, self.uri, self.version)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_id_is_generated_once() {
        let mut request = Request::new(Method::Invite, Uri::new("example.com").enable_scheme());
        assert!(request.headers.call_id().is_none());
        let first = request.call_id();
        let second = request.call_id();
        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());

        let mut other = Request::new(Method::Invite, Uri::new("example.com"));
        assert_ne!(other.call_id(), first);
    }

    #[test]
    fn test_existing_call_id_is_kept() {
        let mut request =
            Request::new(Method::Bye, Uri::new("example.com")).with_header(HeaderName::CALL_ID, "abc@host");
        assert_eq!(request.call_id(), "abc@host");
        assert_eq!(request.headers.len(), 1);
    }

    #[test]
    fn test_content_length_recomputed() {
        let request = Request::new(Method::Message, Uri::new("example.com"))
            .with_header(HeaderName::CONTENT_LENGTH, "999")
            .with_body("hello");
        let wire = request.to_bytes();
        assert_eq!(
            &wire[..],
            b"MESSAGE sip:example.com SIP/2.0\r\nContent-Length: 5\r\n\r\nhello"
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Request::with_defaults(Method::Invite, "a.com").with_body("v=0");
        let mut copy = original.clone();
        copy.uri.host = "b.com".to_string();
        copy.headers.set(HeaderName::MAX_FORWARDS, HeaderValue::MaxForwards(1));
        copy.body = Bytes::from_static(b"changed");
        assert_eq!(original.uri.host, "a.com");
        assert_eq!(original.headers.max_forwards(), Some(70));
        assert_eq!(&original.body[..], b"v=0");
    }

    #[test]
    fn test_context_cancellation() {
        let token = CancellationToken::new();
        let request = Request::new(Method::Invite, Uri::new("a.com")).with_context(token.child_token());
        assert!(!request.is_cancelled());
        token.cancel();
        assert!(request.is_cancelled());
    }
}
