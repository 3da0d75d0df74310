//! # SIP Methods
//!
//! Request methods as they appear in request lines and `CSeq` headers.
//! The standard methods get their own variants; any other valid token is
//! carried as [`Method::Extension`] so unknown traffic still relays.
//!
//! ```rust
//! use sipbridge_sip_core::types::method::Method;
//! use std::str::FromStr;
//!
//! assert_eq!(Method::from_str("INVITE").unwrap(), Method::Invite);
//! assert_eq!(Method::from_str("register").unwrap(), Method::Register);
//! assert_eq!(Method::from_str("PUBLISH").unwrap().as_str(), "PUBLISH");
//! assert!(Method::Invite.is("invite"));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// SIP request method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Invite,
    Ack,
    Cancel,
    Bye,
    Register,
    Options,
    Subscribe,
    Notify,
    Refer,
    Message,
    Info,
    /// Any other method token, stored upper-cased
    Extension(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Invite => "INVITE",
            Method::Ack => "ACK",
            Method::Cancel => "CANCEL",
            Method::Bye => "BYE",
            Method::Register => "REGISTER",
            Method::Options => "OPTIONS",
            Method::Subscribe => "SUBSCRIBE",
            Method::Notify => "NOTIFY",
            Method::Refer => "REFER",
            Method::Message => "MESSAGE",
            Method::Info => "INFO",
            Method::Extension(token) => token,
        }
    }

    /// Case-insensitive comparison against a raw method token
    pub fn is(&self, token: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(token)
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-.!%*_+`'~".contains(c)
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        if token.is_empty() || !token.chars().all(is_token_char) {
            return Err(Error::InvalidMethod(s.to_string()));
        }
        let upper = token.to_ascii_uppercase();
        Ok(match upper.as_str() {
            "INVITE" => Method::Invite,
            "ACK" => Method::Ack,
            "CANCEL" => Method::Cancel,
            "BYE" => Method::Bye,
            "REGISTER" => Method::Register,
            "OPTIONS" => Method::Options,
            "SUBSCRIBE" => Method::Subscribe,
            "NOTIFY" => Method::Notify,
            "REFER" => Method::Refer,
            "MESSAGE" => Method::Message,
            "INFO" => Method::Info,
            _ => Method::Extension(upper),
        })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
