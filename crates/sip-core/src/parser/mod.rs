//! # SIP Parsers
//!
//! Decoding of the wire format:
//!
//! - [`message`]: datagram decoder (start line, header block, body)
//! - [`request`] / [`response`]: start-line parsers built on `nom`
//! - [`headers`]: typed header value parsers
//! - [`registry`]: the injectable header name to parser table
//! - [`utils`]: percent-decoding and quoting helpers

pub mod headers;
pub mod message;
pub mod registry;
pub mod request;
pub mod response;
pub mod utils;

pub use message::{parse_message, parse_request, parse_response};
pub use registry::HeaderParserRegistry;

/// Result type of the `nom` start-line parsers
pub type ParseResult<'a, T> = nom::IResult<&'a str, T>;
