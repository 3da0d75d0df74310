//! # SIP Response
//!
//! A response carries a status code and reason phrase instead of a method
//! and target. A response built for a request keeps a reference to it.
//!
//! ## Examples
//!
//! ```rust
//! use sipbridge_sip_core::types::method::Method;
//! use sipbridge_sip_core::types::sip_request::Request;
//! use sipbridge_sip_core::types::sip_response::Response;
//! use sipbridge_sip_core::types::status::StatusCode;
//! use sipbridge_sip_core::types::headers::HeaderName;
//!
//! let request = Request::with_defaults(Method::Invite, "example.com")
//!     .with_header(HeaderName::CALL_ID, "a84b4c76e66710");
//! let response = Response::from_request(StatusCode::TEMPORARILY_UNAVAILABLE, &request);
//! assert_eq!(response.reason, "Temporarily Unavailable");
//! assert_eq!(response.call_id(), "a84b4c76e66710");
//! assert!(response.to_string().starts_with("SIP/2.0 480 Temporarily Unavailable\r\n"));
//! ```

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::types::headers::{HeaderName, HeaderValue, Headers};
use crate::types::sip_request::{Request, SIP_VERSION};
use crate::types::status::StatusCode;

/// Headers copied from a request into a response built for it
const MIRRORED_HEADERS: [HeaderName; 5] = [
    HeaderName::VIA,
    HeaderName::FROM,
    HeaderName::TO,
    HeaderName::CALL_ID,
    HeaderName::CSEQ,
];

/// A SIP response
#[derive(Debug, Clone)]
pub struct Response {
    /// Protocol version label, `SIP/2.0`
    pub version: String,
    pub status: StatusCode,
    /// Reason phrase written after the status code
    pub reason: String,
    pub headers: Headers,
    pub body: Bytes,
    /// Request this response answers, when built locally
    pub request: Option<Arc<Request>>,
}

impl Response {
    /// Creates a response with the standard reason phrase for `status`
    pub fn new(status: StatusCode) -> Self {
        Response {
            version: SIP_VERSION.to_string(),
            status,
            reason: status.reason_phrase().to_string(),
            headers: Headers::new(),
            body: Bytes::new(),
            request: None,
        }
    }

    /// Creates a response to `request`, copying its `Via`, `From`, `To`,
    /// `Call-ID` and `CSeq` headers.
    pub fn from_request(status: StatusCode, request: &Request) -> Self {
        let mut response = Response::new(status);
        for name in MIRRORED_HEADERS {
            if let Some(value) = request.headers.get(&name) {
                response.headers.set(name, value.clone());
            }
        }
        response.request = Some(Arc::new(request.clone()));
        response
    }

    pub fn with_header(mut self, name: impl Into<HeaderName>, value: impl Into<HeaderValue>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Call identity, or an empty string when the response has no `Call-ID`
    pub fn call_id(&self) -> &str {
        self.headers.call_id().unwrap_or("")
    }

    /// Serializes the response with a freshly computed `Content-Length`
    pub fn to_bytes(&self) -> Bytes {
        let mut out = String::with_capacity(256 + self.body.len());
        let reason = if self.reason.is_empty() {
            self.status.reason_phrase()
        } else {
            &self.reason
        };
        out.push_str(&format!("{} {} {}\r\n", self.version, self.status.as_u16(), reason));
        self.headers.write_with_content_length(&mut out, self.body.len());
        let mut buf = out.into_bytes();
        buf.extend_from_slice(&self.body);
        Bytes::from(buf)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::method::Method;
    use crate::types::uri::Uri;

    #[test]
    fn test_missing_call_id_is_empty() {
        let response = Response::new(StatusCode::OK);
        assert_eq!(response.call_id(), "");
        assert!(response.headers.is_empty());
    }

    #[test]
    fn test_from_request_copies_dialog_headers() {
        let request = Request::new(Method::Register, Uri::new("a.com").enable_scheme())
            .with_header("Via", "SIP/2.0/UDP 10.0.0.5:5060;branch=z9hG4bK1")
            .with_header("From", "<sip:bob@a.com>;tag=1")
            .with_header("To", "<sip:bob@a.com>")
            .with_header("Call-ID", "c1")
            .with_header("CSeq", "1 REGISTER")
            .with_header("User-Agent", "softphone");
        let response = Response::from_request(StatusCode::LOOP_DETECTED, &request);
        let names: Vec<&str> = response.headers.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Via", "From", "To", "Call-ID", "CSeq"]);
        assert_eq!(response.request.as_ref().map(|r| r.method.clone()), Some(Method::Register));
    }

    #[test]
    fn test_serialization() {
        let response = Response::new(StatusCode::OK).with_header("Call-ID", "x").with_body("abc");
        assert_eq!(&response.to_bytes()[..], b"SIP/2.0 200 OK\r\nCall-ID: x\r\nContent-Length: 3\r\n\r\nabc");
    }
}
