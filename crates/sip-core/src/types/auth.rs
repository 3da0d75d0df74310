//! # Authentication Values
//!
//! `Authorization`, `WWW-Authenticate`, `Proxy-Authorization` and
//! `Proxy-Authenticate` share one shape: a scheme followed by
//! comma-separated `key=value` pairs.
//!
//! ```text
//! WWW-Authenticate: Digest realm="atlanta.com", nonce="84a4cc6f", qop=auth, algorithm=MD5
//! ```
//!
//! The relay only carries these values through; computing a digest response
//! is left to the endpoints.
//!
//! ## Examples
//!
//! ```rust
//! use sipbridge_sip_core::types::auth::Credentials;
//!
//! let creds: Credentials = "Digest realm=\"atlanta.com\", nonce=\"84a4cc6f\", qop=auth".parse().unwrap();
//! assert_eq!(creds.scheme, "Digest");
//! assert_eq!(creds.realm.as_deref(), Some("atlanta.com"));
//! assert_eq!(creds.qop.as_deref(), Some("auth"));
//! assert_eq!(creds.to_string(), "Digest realm=\"atlanta.com\", nonce=\"84a4cc6f\", qop=auth");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::headers::parse_credentials;

/// Challenge or response fields of an authentication header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Authentication scheme, usually `Digest`
    pub scheme: String,
    pub username: Option<String>,
    pub realm: Option<String>,
    pub nonce: Option<String>,
    pub uri: Option<String>,
    pub response: Option<String>,
    pub cnonce: Option<String>,
    pub nc: Option<String>,
    pub qop: Option<String>,
    pub algorithm: Option<String>,
    pub opaque: Option<String>,
}

impl Credentials {
    pub fn new(scheme: impl Into<String>) -> Self {
        Credentials {
            scheme: scheme.into(),
            ..Default::default()
        }
    }

    /// Stores a `key=value` pair, ignoring keys that carry no known field.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) {
        let slot = match key.to_ascii_lowercase().as_str() {
            "username" => &mut self.username,
            "realm" => &mut self.realm,
            "nonce" => &mut self.nonce,
            "uri" => &mut self.uri,
            "response" => &mut self.response,
            "cnonce" => &mut self.cnonce,
            "nc" => &mut self.nc,
            "qop" => &mut self.qop,
            "algorithm" => &mut self.algorithm,
            "opaque" => &mut self.opaque,
            _ => return,
        };
        *slot = Some(value.into());
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // (name, value, quoted)
        let fields = [
            ("username", &self.username, true),
            ("realm", &self.realm, true),
            ("nonce", &self.nonce, true),
            ("uri", &self.uri, true),
            ("response", &self.response, true),
            ("cnonce", &self.cnonce, true),
            ("nc", &self.nc, false),
            ("qop", &self.qop, false),
            ("algorithm", &self.algorithm, false),
            ("opaque", &self.opaque, true),
        ];

        f.write_str(&self.scheme)?;
        let mut first = true;
        for (name, value, quoted) in fields {
            let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
                continue;
            };
            f.write_str(if first { " " } else { ", " })?;
            first = false;
            if quoted {
                write!(f, "{}=\"{}\"", name, value)?;
            } else {
                write!(f, "{}={}", name, value)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Credentials {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_credentials(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_authorization() {
        let creds: Credentials = "Digest username=\"1000\", realm=\"192.168.4.169\", nonce=\"abc\", \
             uri=\"sip:192.168.4.169\", response=\"d41d8cd9\", cnonce=\"xyz\", nc=00000001, qop=auth, \
             algorithm=MD5, opaque=\"op\", stale=FALSE"
            .parse()
            .unwrap();
        assert_eq!(creds.username.as_deref(), Some("1000"));
        assert_eq!(creds.uri.as_deref(), Some("sip:192.168.4.169"));
        assert_eq!(creds.nc.as_deref(), Some("00000001"));
        assert_eq!(creds.algorithm.as_deref(), Some("MD5"));
        assert_eq!(creds.opaque.as_deref(), Some("op"));
    }

    #[test]
    fn test_serialization_quoting() {
        let mut creds = Credentials::new("Digest");
        creds.set_field("username", "alice");
        creds.set_field("nc", "00000001");
        creds.set_field("unknown", "ignored");
        assert_eq!(creds.to_string(), "Digest username=\"alice\", nc=00000001");
    }

    #[test]
    fn test_scheme_required() {
        assert!("".parse::<Credentials>().is_err());
    }
}
