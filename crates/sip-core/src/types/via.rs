//! # SIP Via Header
//!
//! The routing-hop header records the transport and address of a hop so
//! replies can find their way back through it.
//!
//! ```text
//! Via: SIP/2.0/UDP pc33.atlanta.com:5060;branch=z9hG4bK776asdhds;rport
//! ```
//!
//! The sent-by address and its parameters (`branch`, `rport`, `received`) are
//! held in a single [`Uri`] without a scheme prefix.
//!
//! ## Examples
//!
//! ```rust
//! use sipbridge_sip_core::types::via::Via;
//!
//! let via: Via = "SIP/2.0/TCP 192.168.4.169:40828;branch=z9hG4bK-1".parse().unwrap();
//! assert_eq!(via.transport, "TCP");
//! assert_eq!(via.uri.port, Some(40828));
//! assert_eq!(via.branch(), Some("z9hG4bK-1"));
//! assert_eq!(via.to_string(), "SIP/2.0/TCP 192.168.4.169:40828;branch=z9hG4bK-1");
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::headers::parse_via;
use crate::types::uri::Uri;

/// Transport used when a Via protocol token names none
pub const DEFAULT_TRANSPORT: &str = "UDP";

/// A single Via hop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Via {
    /// Protocol name, normally `SIP`
    pub protocol: String,
    /// Protocol version, normally `2.0`
    pub version: String,
    /// Transport token (`UDP`, `TCP`, `TLS`, ...)
    pub transport: String,
    /// Sent-by address with the hop parameters
    pub uri: Uri,
}

impl Via {
    /// Creates a `SIP/2.0/<transport>` hop for `uri`
    pub fn new(transport: impl Into<String>, uri: Uri) -> Self {
        Via {
            protocol: "SIP".to_string(),
            version: "2.0".to_string(),
            transport: transport.into(),
            uri,
        }
    }

    /// Creates a hop whose sent-by is a socket address
    pub fn for_socket_addr(transport: impl Into<String>, addr: SocketAddr) -> Self {
        Via::new(transport, Uri::from_socket_addr(addr))
    }

    pub fn branch(&self) -> Option<&str> {
        self.uri.param("branch")
    }

    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.uri.params.set("branch", branch);
    }

    /// Value of the `rport` parameter.
    ///
    /// Returns `Some(None)` for a bare `rport` flag.
    pub fn rport(&self) -> Option<Option<u16>> {
        self.uri.param("rport").map(|v| v.parse().ok())
    }

    /// Sets `rport`, as a flag when `port` is `None`
    pub fn set_rport(&mut self, port: Option<u16>) {
        let value = port.map(|p| p.to_string()).unwrap_or_default();
        self.uri.params.set("rport", value);
    }

    /// The `host[:port]` the hop was sent from
    pub fn sent_by(&self) -> String {
        self.uri.host_port()
    }
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let protocol = if self.protocol.is_empty() { "SIP" } else { &self.protocol };
        let version = if self.version.is_empty() { "2.0" } else { &self.version };
        let transport = if self.transport.is_empty() { DEFAULT_TRANSPORT } else { &self.transport };
        write!(f, "{}/{}/{} {}", protocol, version, transport, self.uri)
    }
}

impl FromStr for Via {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_via(s)
    }
}
