use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::address::Address;
use crate::types::auth::Credentials;
use crate::types::cseq::CSeq;
use crate::types::via::Via;

/// Typed value of a single header field
///
/// The variant is picked by the parser registered for the header name;
/// headers without a dedicated parser stay [`HeaderValue::Text`]. Every
/// variant owns its data, so cloning a value yields an independent copy.
///
/// # Examples
///
/// ```rust
/// use sipbridge_sip_core::types::headers::HeaderValue;
///
/// let list = HeaderValue::List(vec!["INVITE".into(), "ACK".into()]);
/// assert_eq!(list.to_string(), "INVITE, ACK");
///
/// let hops = HeaderValue::MaxForwards(70);
/// assert_eq!(hops.as_max_forwards(), Some(70));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderValue {
    /// Opaque text, kept as received
    Text(String),
    /// Routing hop (`Via`)
    Via(Via),
    /// Display name, URI and parameters (`From`, `To`, `Contact`)
    Address(Address),
    /// Remaining hop count (`Max-Forwards`)
    MaxForwards(i32),
    /// Sequence counter (`CSeq`)
    Sequence(CSeq),
    /// Authentication challenge or response
    Credentials(Credentials),
    /// Comma-separated tokens (`Allow`, `Supported`, `Allow-Events`)
    List(Vec<String>),
}

impl HeaderValue {
    pub fn text(value: impl Into<String>) -> Self {
        HeaderValue::Text(value.into())
    }

    /// Builds a list value from string slices
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HeaderValue::List(values.into_iter().map(Into::into).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_via(&self) -> Option<&Via> {
        match self {
            HeaderValue::Via(via) => Some(via),
            _ => None,
        }
    }

    pub fn as_via_mut(&mut self) -> Option<&mut Via> {
        match self {
            HeaderValue::Via(via) => Some(via),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            HeaderValue::Address(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn as_address_mut(&mut self) -> Option<&mut Address> {
        match self {
            HeaderValue::Address(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn as_max_forwards(&self) -> Option<i32> {
        match self {
            HeaderValue::MaxForwards(hops) => Some(*hops),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&CSeq> {
        match self {
            HeaderValue::Sequence(cseq) => Some(cseq),
            _ => None,
        }
    }

    pub fn as_credentials(&self) -> Option<&Credentials> {
        match self {
            HeaderValue::Credentials(creds) => Some(creds),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            HeaderValue::List(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Text(text) => f.write_str(text),
            HeaderValue::Via(via) => fmt::Display::fmt(via, f),
            HeaderValue::Address(addr) => fmt::Display::fmt(addr, f),
            HeaderValue::MaxForwards(hops) => write!(f, "{}", hops),
            HeaderValue::Sequence(cseq) => fmt::Display::fmt(cseq, f),
            HeaderValue::Credentials(creds) => fmt::Display::fmt(creds, f),
            HeaderValue::List(values) => f.write_str(&values.join(", ")),
        }
    }
}

impl From<Via> for HeaderValue {
    fn from(via: Via) -> Self {
        HeaderValue::Via(via)
    }
}

impl From<Address> for HeaderValue {
    fn from(addr: Address) -> Self {
        HeaderValue::Address(addr)
    }
}

impl From<CSeq> for HeaderValue {
    fn from(cseq: CSeq) -> Self {
        HeaderValue::Sequence(cseq)
    }
}

impl From<Credentials> for HeaderValue {
    fn from(creds: Credentials) -> Self {
        HeaderValue::Credentials(creds)
    }
}

impl From<String> for HeaderValue {
    fn from(text: String) -> Self {
        HeaderValue::Text(text)
    }
}

impl From<&str> for HeaderValue {
    fn from(text: &str) -> Self {
        HeaderValue::Text(text.to_string())
    }
}
