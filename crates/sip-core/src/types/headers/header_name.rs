use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Canonical SIP header name
///
/// Header names are case-insensitive on the wire. A `HeaderName` always
/// stores the canonical spelling, so two names compare equal exactly when
/// they denote the same header:
///
/// - well-known SIP headers keep their registered spelling (`Call-ID`,
///   `CSeq`, `WWW-Authenticate`)
/// - compact forms expand to the full name (`v` is `Via`, `i` is `Call-ID`)
/// - anything else is MIME-canonicalised (`x-custom-thing` is
///   `X-Custom-Thing`)
///
/// # Examples
///
/// ```rust
/// use sipbridge_sip_core::types::headers::HeaderName;
///
/// assert_eq!(HeaderName::new("call-id"), HeaderName::CALL_ID);
/// assert_eq!(HeaderName::new("i"), HeaderName::CALL_ID);
/// assert_eq!(HeaderName::new("cseq").as_str(), "CSeq");
/// assert_eq!(HeaderName::new("x-custom-thing").as_str(), "X-Custom-Thing");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeaderName(Cow<'static, str>);

macro_rules! well_known_headers {
    ($(($konst:ident, $name:literal $(, $compact:literal)?);)+) => {
        impl HeaderName {
            $(
                pub const $konst: HeaderName = HeaderName(Cow::Borrowed($name));
            )+

            fn well_known(lower: &str) -> Option<HeaderName> {
                $(
                    if lower.eq_ignore_ascii_case($name) $(|| lower == $compact)? {
                        return Some(HeaderName::$konst);
                    }
                )+
                None
            }
        }
    };
}

well_known_headers! {
    (VIA, "Via", "v");
    (MAX_FORWARDS, "Max-Forwards");
    (CONTACT, "Contact", "m");
    (FROM, "From", "f");
    (TO, "To", "t");
    (CALL_ID, "Call-ID", "i");
    (CSEQ, "CSeq");
    (EXPIRES, "Expires");
    (ALLOW, "Allow");
    (SUPPORTED, "Supported", "k");
    (USER_AGENT, "User-Agent");
    (ALLOW_EVENTS, "Allow-Events");
    (CONTENT_LENGTH, "Content-Length", "l");
    (CONTENT_TYPE, "Content-Type", "c");
    (CONTENT_ENCODING, "Content-Encoding", "e");
    (SUBJECT, "Subject", "s");
    (AUTHORIZATION, "Authorization");
    (WWW_AUTHENTICATE, "WWW-Authenticate");
    (PROXY_AUTHORIZATION, "Proxy-Authorization");
    (PROXY_AUTHENTICATE, "Proxy-Authenticate");
    (RECORD_ROUTE, "Record-Route");
    (ROUTE, "Route");
    (DATE, "Date");
    (REASON, "Reason");
    (REQUIRE, "Require");
    (SESSION_EXPIRES, "Session-Expires");
    (MIN_SE, "Min-SE");
}

impl HeaderName {
    /// Creates a header name from any spelling, canonicalising it
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        let lower = name.to_ascii_lowercase();
        match HeaderName::well_known(&lower) {
            Some(known) => known,
            None => HeaderName(Cow::Owned(mime_canonical(&lower))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Upper-cases the first letter and every letter following a `-`
fn mime_canonical(lower: &str) -> String {
    let mut out = String::with_capacity(lower.len());
    let mut upper_next = true;
    for c in lower.chars() {
        if upper_next {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        upper_next = c == '-';
    }
    out
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HeaderName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == ':') {
            return Err(Error::MalformedHeaderLine(format!("Invalid header name: '{}'", s)));
        }
        Ok(HeaderName::new(name))
    }
}

impl AsRef<str> for HeaderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HeaderName {
    fn from(name: &str) -> Self {
        HeaderName::new(name)
    }
}
