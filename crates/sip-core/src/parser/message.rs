//! Datagram decoder.
//!
//! A datagram is a start line, a header block terminated by an empty line
//! and an optional body whose length comes from `Content-Length`.

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::parser::registry::HeaderParserRegistry;
use crate::parser::request::parse_request_line;
use crate::parser::response::parse_status_line;
use crate::types::headers::{HeaderName, Headers};
use crate::types::message::Message;
use crate::types::sip_request::Request;
use crate::types::sip_response::Response;

/// Literal that starts every status line
pub const RESPONSE_PREFIX: &[u8] = b"SIP";

/// Returns `true` if the datagram starts like a response
pub fn is_response(data: &[u8]) -> bool {
    data.starts_with(RESPONSE_PREFIX)
}

/// Splits the datagram into the head (start line and headers) and the body.
fn split_head(data: &[u8]) -> (&[u8], &[u8]) {
    if let Some(pos) = find(data, b"\r\n\r\n") {
        return (&data[..pos], &data[pos + 4..]);
    }
    if let Some(pos) = find(data, b"\n\n") {
        return (&data[..pos], &data[pos + 2..]);
    }
    (data, &[])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Reads header lines into a collection.
///
/// Continuation lines (starting with a space or tab) are folded into the
/// previous header. A repeated header replaces the earlier value at its
/// original position.
pub fn parse_headers<'a, I>(lines: I, registry: &HeaderParserRegistry) -> Result<Headers>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut unfolded: Vec<String> = Vec::new();
    for line in lines {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(previous) = unfolded.last_mut() {
                previous.push(' ');
                previous.push_str(line.trim());
                continue;
            }
        }
        unfolded.push(line.to_string());
    }

    let mut headers = Headers::new();
    for line in &unfolded {
        let (name, value) = parse_header_line(line)?;
        let value = registry.parse_lenient(&name, value);
        headers.set(name, value);
    }
    Ok(headers)
}

/// Splits `Name: value` at the first colon
pub fn parse_header_line(line: &str) -> Result<(HeaderName, &str)> {
    let line = line.trim();
    let pos = line
        .find(':')
        .ok_or_else(|| Error::MalformedHeaderLine(line.to_string()))?;
    let name: HeaderName = line[..pos].parse()?;
    Ok((name, line[pos + 1..].trim()))
}

fn read_body(headers: &Headers, available: &[u8]) -> Result<Bytes> {
    let expected = headers.content_length().unwrap_or(0);
    if expected == 0 {
        return Ok(Bytes::new());
    }
    if available.len() < expected {
        return Err(Error::ShortBody {
            expected,
            actual: available.len(),
        });
    }
    Ok(Bytes::copy_from_slice(&available[..expected]))
}

/// Decodes one datagram into a request or a response.
///
/// # Examples
///
/// ```rust
/// use sipbridge_sip_core::parser::message::parse_message;
/// use sipbridge_sip_core::parser::registry::HeaderParserRegistry;
///
/// let registry = HeaderParserRegistry::default();
/// let data = b"SIP/2.0 200 OK\r\nCall-ID: abc\r\nCSeq: 1 INVITE\r\nContent-Length: 0\r\n\r\n";
/// let message = parse_message(data, &registry).unwrap();
/// assert!(message.is_response());
/// assert_eq!(message.headers().cseq().map(|c| c.seq), Some(1));
/// ```
pub fn parse_message(data: &[u8], registry: &HeaderParserRegistry) -> Result<Message> {
    let (head, body) = split_head(data);
    let head = std::str::from_utf8(head)?;
    let mut lines = head.split('\n');
    let start_line = lines
        .next()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| Error::InvalidStartLine(String::new()))?;

    if is_response(data) {
        let (version, status, reason) = parse_status_line(start_line)?;
        let headers = parse_headers(lines, registry)?;
        let body = read_body(&headers, body)?;
        Ok(Message::Response(Response {
            version,
            status,
            reason,
            headers,
            body,
            request: None,
        }))
    } else {
        let (method, uri, version) = parse_request_line(start_line)?;
        let headers = parse_headers(lines, registry)?;
        let body = read_body(&headers, body)?;
        let mut request = Request::new(method, uri).with_body(body);
        request.version = version;
        request.headers = headers;
        Ok(Message::Request(request))
    }
}

/// Decodes a datagram that must be a request
pub fn parse_request(data: &[u8], registry: &HeaderParserRegistry) -> Result<Request> {
    match parse_message(data, registry)? {
        Message::Request(request) => Ok(request),
        Message::Response(_) => Err(Error::InvalidStartLine("expected a request".to_string())),
    }
}

/// Decodes a datagram that must be a response
pub fn parse_response(data: &[u8], registry: &HeaderParserRegistry) -> Result<Response> {
    match parse_message(data, registry)? {
        Message::Response(response) => Ok(response),
        Message::Request(_) => Err(Error::InvalidStartLine("expected a response".to_string())),
    }
}
