//! Core SIP message model for sipbridge
//!
//! This crate provides the SIP address, header and message types together
//! with the datagram decoder used by the relay.
//!
//! ## Examples
//!
//! ```rust
//! use sipbridge_sip_core::prelude::*;
//!
//! let registry = HeaderParserRegistry::default();
//! let data = b"REGISTER sip:a.com SIP/2.0\r\n\
//!     Via: SIP/2.0/UDP 10.0.0.5:5060;branch=z9hG4bK-1\r\n\
//!     From: <sip:bob@a.com>;tag=1\r\n\
//!     To: <sip:bob@a.com>\r\n\
//!     Call-ID: reg-1\r\n\
//!     CSeq: 1 REGISTER\r\n\
//!     Max-Forwards: 70\r\n\
//!     Content-Length: 0\r\n\r\n";
//!
//! let Message::Request(mut request) = parse_message(data, &registry).unwrap() else {
//!     panic!("expected a request");
//! };
//! assert_eq!(request.method, Method::Register);
//! assert_eq!(request.call_id(), "reg-1");
//! assert_eq!(request.headers.address("From").unwrap().uri.host, "a.com");
//! ```

pub mod error;
pub mod parser;
pub mod types;

pub use error::{Error, Result};
pub use parser::{parse_message, HeaderParserRegistry};
pub use types::{
    Address, CSeq, Credentials, HeaderName, HeaderValue, Headers, Message, Method, Params, Request, Response,
    StatusCode, Uri, Via,
};

/// Re-export of common types and functions
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::parser::{parse_message, parse_request, parse_response, HeaderParserRegistry};
    pub use crate::types::{
        Address, CSeq, Credentials, HeaderName, HeaderValue, Headers, Message, Method, Params, Request,
        Response, StatusCode, Uri, Via,
    };
}
