//! CSeq header value: a sequence number and the method it belongs to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::headers::parse_cseq;
use crate::types::method::Method;

/// Sequence counter of a request within a call
///
/// # Examples
///
/// ```rust
/// use sipbridge_sip_core::types::cseq::CSeq;
/// use sipbridge_sip_core::types::method::Method;
///
/// let cseq: CSeq = "314159 INVITE".parse().unwrap();
/// assert_eq!(cseq.seq, 314159);
/// assert_eq!(cseq.method, Method::Invite);
/// assert!("314159".parse::<CSeq>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CSeq {
    pub seq: u32,
    pub method: Method,
}

impl CSeq {
    pub fn new(seq: u32, method: Method) -> Self {
        CSeq { seq, method }
    }
}

impl fmt::Display for CSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.seq, self.method)
    }
}

impl FromStr for CSeq {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_cseq(s)
    }
}
