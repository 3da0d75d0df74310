//! # SIP URI Implementation
//!
//! This module provides the address model used throughout the relay: the
//! SIP URI found in request lines and in `Via`, `From`, `To` and `Contact`
//! headers.
//!
//! ## URI Structure
//!
//! ```text
//! [sip:|sips:]user:password@host:port;uri-parameters?queries
//! ```
//!
//! - The scheme prefix is optional. It is remembered so a parsed URI is
//!   written back the way it was read (a `Via` sent-by has no scheme, a
//!   `Contact` address does).
//! - `user:password@` is optional.
//! - `host` is required; IPv6 references keep their brackets.
//! - Parameters (`;key=value`) and queries (`?key=value&key=value`) are
//!   percent-decoded when read.
//!
//! ## Usage Examples
//!
//! ```rust
//! use sipbridge_sip_core::types::uri::Uri;
//! use std::str::FromStr;
//!
//! let uri = Uri::from_str("sip:alice@example.com:5060;transport=udp?subject=meeting").unwrap();
//! assert!(uri.has_scheme);
//! assert!(!uri.secure);
//! assert_eq!(uri.user.as_deref(), Some("alice"));
//! assert_eq!(uri.host, "example.com");
//! assert_eq!(uri.port, Some(5060));
//! assert_eq!(uri.param("transport"), Some("udp"));
//! assert_eq!(uri.query("subject"), Some("meeting"));
//!
//! let uri = Uri::new("example.com").with_user("bob").with_port(5060).enable_scheme();
//! assert_eq!(uri.to_string(), "sip:bob@example.com:5060");
//! ```

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::param::Params;

/// Longest scheme token accepted before the first `:` (`sips`)
const MAX_SCHEME_LEN: usize = 4;

/// SIP URI components
///
/// A `Uri` is a plain value: cloning it yields a fully independent copy,
/// including its parameter and query sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uri {
    /// `sips:` (true) or `sip:` (false)
    pub secure: bool,
    /// Whether the scheme prefix is written on output
    pub has_scheme: bool,
    /// User part (optional)
    pub user: Option<String>,
    /// Password (optional, deprecated)
    pub password: Option<String>,
    /// Host name or IP literal (IPv6 keeps its brackets)
    pub host: String,
    /// Port (optional)
    pub port: Option<u16>,
    /// URI parameters (`;key=value`)
    pub params: Params,
    /// URI queries (`?key=value&key=value`)
    pub queries: Params,
}

impl Uri {
    /// Create a new URI with only a host
    pub fn new(host: impl Into<String>) -> Self {
        Uri {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Create a URI pointing at a socket address.
    ///
    /// IPv6 addresses are bracketed so the host/port split stays unambiguous.
    pub fn from_socket_addr(addr: SocketAddr) -> Self {
        let host = match addr.ip() {
            IpAddr::V4(ip) => ip.to_string(),
            IpAddr::V6(ip) => format!("[{}]", ip),
        };
        Uri {
            host,
            port: Some(addr.port()),
            ..Default::default()
        }
    }

    /// Turns on the `sip:` prefix for serialization
    pub fn enable_scheme(mut self) -> Self {
        self.has_scheme = true;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Value of the URI parameter `name`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Value of the URI query `name`
    pub fn query(&self, name: &str) -> Option<&str> {
        self.queries.get(name)
    }

    /// Returns the host and port (if present) formatted as a string
    ///
    /// # Examples
    ///
    /// ```
    /// use sipbridge_sip_core::types::uri::Uri;
    ///
    /// assert_eq!(Uri::new("example.com").with_port(5060).host_port(), "example.com:5060");
    /// assert_eq!(Uri::new("example.com").host_port(), "example.com");
    /// ```
    pub fn host_port(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }

    /// Sets host and port from a combined `host[:port]` string.
    ///
    /// A string without a port only replaces the host. A port that is not a
    /// valid number leaves the URI untouched and returns an error.
    pub fn set_host_port(&mut self, addr: &str) -> Result<()> {
        let (host, port) = split_host_port(addr)?;
        self.host = host.to_string();
        if port.is_some() {
            self.port = port;
        }
        Ok(())
    }

    /// Resolves the host/port pair to a socket address when the host is an
    /// IP literal and a port is present.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        let port = self.port?;
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        let ip: IpAddr = host.parse().ok()?;
        Some(SocketAddr::new(ip, port))
    }

    /// Returns `true` if this URI addresses exactly `addr`
    pub fn points_to(&self, addr: &SocketAddr) -> bool {
        self.socket_addr().as_ref() == Some(addr)
    }

    /// Parses a URI, keeping whatever could be read.
    ///
    /// A malformed parameter or query token, or an unreadable port, does not
    /// abort parsing: the partial URI is returned together with the first
    /// error encountered.
    pub fn parse_lenient(input: &str) -> (Uri, Option<Error>) {
        let mut uri = Uri::default();
        let mut first_error: Option<Error> = None;
        let mut rest = input.trim();

        // sip: or sips:
        if let Some(pos) = rest.find(':') {
            let scheme = &rest[..pos];
            // `host:port` with a short host name is not a scheme
            let after = &rest[pos + 1..];
            let port_like = after
                .split(|c| c == ';' || c == '?')
                .next()
                .map_or(false, |p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
            if pos > 0 && pos <= MAX_SCHEME_LEN && !port_like && scheme.chars().all(|c| c.is_ascii_alphabetic()) {
                uri.has_scheme = true;
                uri.secure = scheme.eq_ignore_ascii_case("sips");
                rest = &rest[pos + 1..];
            }
        }

        if let Some(at) = rest.find('@') {
            let userinfo = &rest[..at];
            match userinfo.find(':') {
                Some(colon) => {
                    uri.user = Some(userinfo[..colon].to_string());
                    uri.password = Some(userinfo[colon + 1..].to_string());
                }
                None => uri.user = Some(userinfo.to_string()),
            }
            rest = &rest[at + 1..];
        }

        let split = rest.find(|c| c == ';' || c == '?');
        let host_port = match split {
            Some(pos) => &rest[..pos],
            None => rest,
        };
        match split_host_port(host_port) {
            Ok((host, port)) => {
                uri.host = host.to_string();
                uri.port = port;
            }
            Err(e) => {
                uri.host = host_port.to_string();
                first_error.get_or_insert(e);
            }
        }

        if let Some(pos) = split {
            let tail = &rest[pos..];
            let (params, queries) = match tail.strip_prefix('?') {
                Some(queries) => ("", queries),
                None => match tail[1..].find('?') {
                    Some(q) => (&tail[1..q + 1], &tail[q + 2..]),
                    None => (&tail[1..], ""),
                },
            };
            let (parsed, err) = Params::parse_lenient(params);
            uri.params = parsed;
            if let Some(e) = err {
                first_error.get_or_insert(e);
            }
            let (parsed, err) = Params::parse_lenient(queries);
            uri.queries = parsed;
            if let Some(e) = err {
                first_error.get_or_insert(e);
            }
        }

        (uri, first_error)
    }
}

/// Splits `host[:port]`, honouring bracketed IPv6 references.
fn split_host_port(addr: &str) -> Result<(&str, Option<u16>)> {
    let addr = addr.trim();
    let (host, port) = if addr.starts_with('[') {
        let end = addr
            .find(']')
            .ok_or_else(|| Error::InvalidUri(format!("Malformed IPv6 address (unclosed bracket): {}", addr)))?;
        let host = &addr[..=end];
        match addr[end + 1..].strip_prefix(':') {
            Some(port) => (host, Some(port)),
            None => (host, None),
        }
    } else {
        match addr.find(':') {
            Some(pos) => (&addr[..pos], Some(&addr[pos + 1..])),
            None => (addr, None),
        }
    };

    let port = match port {
        Some(p) => {
            let port: u16 = p
                .parse()
                .map_err(|_| Error::InvalidUri(format!("Invalid port '{}' in {}", p, addr)))?;
            if port == 0 { None } else { Some(port) }
        }
        None => None,
    };
    Ok((host, port))
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_scheme {
            f.write_str(if self.secure { "sips:" } else { "sip:" })?;
        }
        if let Some(user) = self.user.as_deref().filter(|u| !u.is_empty()) {
            f.write_str(user)?;
            if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
                write!(f, ":{}", password)?;
            }
            f.write_str("@")?;
        }
        f.write_str(&self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        if !self.params.is_empty() {
            write!(f, ";{}", self.params)?;
        }
        if !self.queries.is_empty() {
            write!(f, "?{}", self.queries.to_string_with('&'))?;
        }
        Ok(())
    }
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (uri, err) = Uri::parse_lenient(s);
        if let Some(err) = err {
            return Err(err);
        }
        if uri.host.is_empty() {
            return Err(Error::InvalidUri(format!("Host cannot be empty: '{}'", s)));
        }
        Ok(uri)
    }
}

impl From<SocketAddr> for Uri {
    fn from(addr: SocketAddr) -> Self {
        Uri::from_socket_addr(addr)
    }
}
