//! # Name-Address Values
//!
//! `From`, `To` and `Contact` carry a URI in angle brackets, an optional
//! display name in front of it and header parameters (such as `tag`) after
//! it.
//!
//! ```text
//! From: "Alice" <sip:alice@atlanta.com>;tag=1928301774
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use sipbridge_sip_core::types::address::Address;
//!
//! let addr: Address = "\"Alice\" <sip:alice@atlanta.com>;tag=1928301774".parse().unwrap();
//! assert_eq!(addr.display_name.as_deref(), Some("Alice"));
//! assert_eq!(addr.uri.host, "atlanta.com");
//! assert_eq!(addr.tag(), Some("1928301774"));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::headers::parse_address;
use crate::types::param::Params;
use crate::types::uri::Uri;

/// A display name, URI and header parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub display_name: Option<String>,
    pub uri: Uri,
    pub params: Params,
}

impl Address {
    pub fn new(uri: Uri) -> Self {
        Address {
            display_name: None,
            uri,
            params: Params::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn tag(&self) -> Option<&str> {
        self.params.get("tag")
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.params.set("tag", tag);
    }

    /// `user@host` identity of the address, or `None` without a user part
    pub fn user_at_host(&self) -> Option<String> {
        let user = self.uri.user.as_deref().filter(|u| !u.is_empty())?;
        Some(format!("{}@{}", user, self.uri.host))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.is_empty()) {
            write!(f, "\"{}\" ", name)?;
        }
        write!(f, "<{}>", self.uri)?;
        if !self.params.is_empty() {
            write!(f, ";{}", self.params)?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_address(s)
    }
}
