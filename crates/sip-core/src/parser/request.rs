use nom::{
    bytes::complete::take_till1,
    character::complete::space1,
    combinator::rest,
    sequence::tuple,
};

use crate::error::{Error, Result};
use crate::parser::ParseResult;
use crate::types::method::Method;
use crate::types::uri::Uri;

// Request-Line = Method SP Request-URI SP SIP-Version
fn request_line_parts(input: &str) -> ParseResult<'_, (&str, &str, &str, &str, &str)> {
    tuple((
        take_till1(|c: char| c == ' '),
        space1,
        take_till1(|c: char| c == ' '),
        space1,
        rest,
    ))(input)
}

/// Parses a request line without its line terminator.
///
/// # Examples
///
/// ```rust
/// use sipbridge_sip_core::parser::request::parse_request_line;
/// use sipbridge_sip_core::types::method::Method;
///
/// let (method, uri, version) = parse_request_line("READ sip:1000@192.168.4.169;transport=udp SIP/2.0").unwrap();
/// assert_eq!(method, Method::Extension("READ".to_string()));
/// assert_eq!(uri.user.as_deref(), Some("1000"));
/// assert_eq!(uri.param("transport"), Some("udp"));
/// assert_eq!(version, "SIP/2.0");
/// ```
pub fn parse_request_line(line: &str) -> Result<(Method, Uri, String)> {
    let line = line.trim();
    let (_, (method, _, target, _, version)) =
        request_line_parts(line).map_err(|_| Error::InvalidStartLine(line.to_string()))?;

    let version = version.trim();
    if version.is_empty() || version.contains(' ') {
        return Err(Error::InvalidStartLine(line.to_string()));
    }
    let method: Method = method.parse()?;
    let uri: Uri = target
        .parse()
        .map_err(|e: Error| Error::InvalidStartLine(format!("{}: {}", line, e)))?;
    Ok((method, uri, version.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_line() {
        let (method, uri, version) = parse_request_line("INVITE sip:bob@biloxi.com SIP/2.0").unwrap();
        assert_eq!(method, Method::Invite);
        assert!(uri.has_scheme);
        assert_eq!(uri.host, "biloxi.com");
        assert_eq!(version, "SIP/2.0");
    }

    #[test]
    fn test_malformed_request_lines() {
        assert!(matches!(parse_request_line("INVITE"), Err(Error::InvalidStartLine(_))));
        assert!(matches!(parse_request_line("INVITE sip:bob@biloxi.com"), Err(Error::InvalidStartLine(_))));
        assert!(matches!(parse_request_line("INVITE sip:bob@ SIP/2.0"), Err(Error::InvalidStartLine(_))));
        assert!(matches!(parse_request_line("INV@TE sip:bob@b.com SIP/2.0"), Err(Error::InvalidMethod(_))));
    }
}
