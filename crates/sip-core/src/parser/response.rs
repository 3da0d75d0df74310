use nom::{
    bytes::complete::{take_till, take_till1, take_while_m_n},
    character::complete::{space0, space1},
    combinator::map_res,
    sequence::tuple,
};

use crate::error::{Error, Result};
use crate::parser::ParseResult;
use crate::types::status::StatusCode;

/// Parser for the status line
///
/// ABNF Grammar:
/// Status-Line =  SIP-Version SP Status-Code SP Reason-Phrase CRLF
/// Status-Code =  3DIGIT
fn status_line_parts(input: &str) -> ParseResult<'_, (&str, &str, u16, &str, &str)> {
    tuple((
        take_till1(|c: char| c == ' '),
        space1,
        map_res(take_while_m_n(3, 3, |c: char| c.is_ascii_digit()), str::parse::<u16>),
        space0,
        take_till(|c: char| c == '\r' || c == '\n'),
    ))(input)
}

/// Parses a status line without its line terminator. The reason phrase may
/// be empty.
///
/// # Examples
///
/// ```rust
/// use sipbridge_sip_core::parser::response::parse_status_line;
///
/// let (version, status, reason) = parse_status_line("SIP/2.0 404 Not Found").unwrap();
/// assert_eq!(version, "SIP/2.0");
/// assert_eq!(status.as_u16(), 404);
/// assert_eq!(reason, "Not Found");
/// ```
pub fn parse_status_line(line: &str) -> Result<(String, StatusCode, String)> {
    let line = line.trim();
    let (remaining, (version, _, code, separator, reason)) =
        status_line_parts(line).map_err(|_| Error::InvalidStartLine(line.to_string()))?;

    // "SIP/2.0 2000" would otherwise read as 200 with reason "0"
    if !remaining.is_empty() || (separator.is_empty() && !reason.is_empty()) {
        return Err(Error::InvalidStartLine(line.to_string()));
    }
    let status = StatusCode::from_u16(code)?;
    Ok((version.to_string(), status, reason.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        let (_, status, reason) = parse_status_line("SIP/2.0 200 OK").unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reason, "OK");

        let (_, status, reason) = parse_status_line("SIP/2.0 183 Session Progress (Early Media)").unwrap();
        assert_eq!(status.as_u16(), 183);
        assert_eq!(reason, "Session Progress (Early Media)");

        let (_, status, reason) = parse_status_line("SIP/2.0 200").unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reason, "");
    }

    #[test]
    fn test_bad_status_lines() {
        assert!(parse_status_line("SIP/2.0 20 OK").is_err());
        assert!(parse_status_line("SIP/2.0 2000 OK").is_err());
        assert!(parse_status_line("SIP/2.0 ABC OK").is_err());
        assert!(matches!(parse_status_line("SIP/2.0 099 Odd"), Err(Error::InvalidStatusCode(99))));
        assert!(parse_status_line("SIP/2.0").is_err());
    }
}
