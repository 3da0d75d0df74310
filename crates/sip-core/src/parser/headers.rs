//! Parsers for typed header values.
//!
//! Each parser takes the header value with the name and colon already
//! stripped and returns the typed value or an [`Error::InvalidHeader`].

use nom::{
    bytes::complete::{take_till1, take_while1},
    character::complete::{digit1, space0, space1},
    combinator::{map_res, rest},
    sequence::tuple,
    IResult,
};

use crate::error::{Error, Result};
use crate::parser::utils::trim_quotes;
use crate::types::address::Address;
use crate::types::auth::Credentials;
use crate::types::cseq::CSeq;
use crate::types::method::Method;
use crate::types::param::Params;
use crate::types::uri::Uri;
use crate::types::via::{Via, DEFAULT_TRANSPORT};

// sent-protocol SP sent-by [params]
fn via_parts(input: &str) -> IResult<&str, (&str, &str, &str)> {
    tuple((take_till1(|c: char| c.is_whitespace()), space1, rest))(input)
}

/// Parses `SIP/2.0/UDP host[:port][;params]`.
///
/// A protocol token with only two segments gets the default transport. When
/// the value lists several hops, only the first one is read.
pub fn parse_via(input: &str) -> Result<Via> {
    let input = input.trim();
    let (_, (protocol, _, sent_by)) =
        via_parts(input).map_err(|_| Error::invalid_header("Via", format!("unknown string '{}'", input)))?;

    let sent_by = match sent_by.find(',') {
        Some(pos) => &sent_by[..pos],
        None => sent_by,
    };

    let segments: Vec<&str> = protocol.split('/').collect();
    let (protocol, version, transport) = match segments.as_slice() {
        [p, v, t] => (*p, *v, *t),
        [p, v] => (*p, *v, DEFAULT_TRANSPORT),
        _ => {
            return Err(Error::invalid_header(
                "Via",
                format!("invalid protocol string {}", protocol),
            ))
        }
    };

    let uri: Uri = sent_by.trim().parse().map_err(|e: Error| Error::invalid_header("Via", e.to_string()))?;
    Ok(Via {
        protocol: protocol.to_string(),
        version: version.to_string(),
        transport: transport.to_string(),
        uri,
    })
}

/// Parses `["Display Name"] <uri>[;params]`.
///
/// The angle brackets are mandatory.
pub fn parse_address(input: &str) -> Result<Address> {
    let input = input.trim();
    let (open, close) = match (input.rfind('<'), input.rfind('>')) {
        (Some(open), Some(close)) if open < close => (open, close),
        _ => return Err(Error::invalid_header("Address", format!("missing '<>' {}", input))),
    };

    let display_name = trim_quotes(&input[..open]);
    let uri: Uri = input[open + 1..close]
        .parse()
        .map_err(|e: Error| Error::invalid_header("Address", e.to_string()))?;
    let params: Params = input[close + 1..]
        .parse()
        .map_err(|e: Error| Error::invalid_header("Address", e.to_string()))?;

    Ok(Address {
        display_name: (!display_name.is_empty()).then(|| display_name.to_string()),
        uri,
        params,
    })
}

fn cseq_parts(input: &str) -> IResult<&str, (u32, &str, &str, &str, &str)> {
    tuple((
        map_res(digit1, str::parse::<u32>),
        space1,
        take_while1(|c: char| !c.is_whitespace()),
        space0,
        rest,
    ))(input)
}

/// Parses `<number> <METHOD>`; anything but exactly two tokens is an error.
pub fn parse_cseq(input: &str) -> Result<CSeq> {
    let input = input.trim();
    match cseq_parts(input) {
        Ok((_, (seq, _, method, _, ""))) => Ok(CSeq {
            seq,
            method: method.parse()?,
        }),
        _ => Err(Error::invalid_header("CSeq", format!("unknown string {}", input))),
    }
}

/// Parses a bare hop count.
pub fn parse_max_forwards(input: &str) -> Result<i32> {
    input
        .trim()
        .parse()
        .map_err(|_| Error::invalid_header("Max-Forwards", format!("not an integer: {}", input)))
}

/// Splits a comma-separated list, trimming each element.
pub fn parse_list(input: &str) -> Vec<String> {
    input.split(',').map(|item| item.trim().to_string()).collect()
}

/// Parses `<scheme> key=value, key="value", ...`.
///
/// Values are unquoted; keys without a matching field are ignored.
pub fn parse_credentials(input: &str) -> Result<Credentials> {
    let input = input.trim();
    let (scheme, pairs) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
    if scheme.is_empty() {
        return Err(Error::invalid_header("Authorization", "missing scheme"));
    }

    let mut creds = Credentials::new(scheme);
    for pair in pairs.split(',') {
        if let Some(pos) = pair.find('=') {
            let key = pair[..pos].trim();
            let value = pair[pos + 1..].trim().trim_matches('"');
            creds.set_field(key, value);
        }
    }
    Ok(creds)
}

/// Parses a method token
pub fn parse_method(input: &str) -> Result<Method> {
    input.parse()
}
