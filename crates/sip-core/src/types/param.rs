//! # SIP Parameters
//!
//! Parameters attach `key[=value]` pairs to URIs and header values:
//!
//! - URI parameters (e.g., `sip:user@example.com;transport=tcp`)
//! - URI queries (e.g., `sip:user@example.com?subject=meeting&priority=urgent`)
//! - Header field parameters (e.g., `<sip:bob@192.0.2.4>;tag=a6c85cf`)
//!
//! [`Params`] keeps one value per key. Lookups and equality ignore ordering,
//! serialization follows insertion order.
//!
//! ## Examples
//!
//! ```rust
//! use sipbridge_sip_core::types::param::Params;
//!
//! let mut params = Params::new();
//! params.set("transport", "udp");
//! params.set("lr", "");
//! assert_eq!(params.to_string(), "transport=udp;lr");
//!
//! let parsed: Params = "branch=z9hG4bK-1;rport".parse().unwrap();
//! assert_eq!(parsed.get("branch"), Some("z9hG4bK-1"));
//! assert!(parsed.contains("rport"));
//! ```

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::utils::{needs_quoting, trim_quotes, unescape_uri_component};

/// A set of `key[=value]` parameters with unique keys.
///
/// Flag parameters (such as `lr` or `rport`) are stored with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params(IndexMap<String, String>);

impl Params {
    /// Creates an empty parameter set
    pub fn new() -> Self {
        Params(IndexMap::new())
    }

    /// Returns the value of `key`, or `None` if the parameter is absent.
    ///
    /// Flag parameters return `Some("")`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.as_str())
    }

    /// Sets `key` to `value`, replacing any previous value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder form of [`Params::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Removes `key` and returns its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    /// Returns `true` if `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes the parameters joined by `sep`.
    ///
    /// Values containing whitespace are wrapped in double quotes.
    pub fn to_string_with(&self, sep: char) -> String {
        let mut out = String::new();
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(sep);
            }
            out.push_str(key);
            if !value.is_empty() {
                out.push('=');
                if needs_quoting(value) {
                    out.push('"');
                    out.push_str(value);
                    out.push('"');
                } else {
                    out.push_str(value);
                }
            }
        }
        out
    }

    /// Parses a `;` or `&` delimited parameter block, keeping going past
    /// tokens that fail to unescape.
    ///
    /// Every pair that decodes is kept. The first decoding error, if any, is
    /// returned alongside the partial result so callers can decide whether to
    /// continue.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sipbridge_sip_core::types::param::Params;
    ///
    /// let (params, err) = Params::parse_lenient("a=1;b=%G0;c=\"two words\"");
    /// assert_eq!(params.get("a"), Some("1"));
    /// assert_eq!(params.get("b"), None);
    /// assert_eq!(params.get("c"), Some("two words"));
    /// assert!(err.is_some());
    /// ```
    pub fn parse_lenient(input: &str) -> (Params, Option<Error>) {
        let mut params = Params::new();
        let mut first_error = None;

        for token in input.split(|c| c == ';' || c == '&') {
            if token.is_empty() {
                continue;
            }
            let (raw_key, raw_value) = match token.find('=') {
                Some(pos) => (&token[..pos], &token[pos + 1..]),
                None => (token, ""),
            };
            let key = match unescape_uri_component(raw_key.trim()) {
                Ok(key) => key,
                Err(e) => {
                    first_error.get_or_insert(e);
                    continue;
                }
            };
            if key.is_empty() {
                continue;
            }
            let value = match unescape_uri_component(raw_value) {
                Ok(value) => value,
                Err(e) => {
                    first_error.get_or_insert(e);
                    continue;
                }
            };
            let value = if value.is_empty() {
                value
            } else {
                trim_quotes(&value).to_string()
            };
            params.set(key, value);
        }

        (params, first_error)
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(';'))
    }
}

impl FromStr for Params {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match Params::parse_lenient(s) {
            (params, None) => Ok(params),
            (_, Some(err)) => Err(err),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut params = Params::new();
        params.set("a", "1");
        params.set("b", "2");
        params.set("a", "3");
        assert_eq!(params.to_string(), "a=3;b=2");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_quoting_on_output() {
        let mut params = Params::new();
        params.set("a", "b");
        params.set("aaa", "sdas\tdsds");
        assert_eq!(params.to_string(), "a=b;aaa=\"sdas\tdsds\"");
        assert_eq!(params.to_string_with('&'), "a=b&aaa=\"sdas\tdsds\"");
    }

    #[test]
    fn test_parse_mixed_separators() {
        let params: Params = "rinstance=e7be;transport=tcp&x=y".parse().unwrap();
        assert_eq!(params.get("rinstance"), Some("e7be"));
        assert_eq!(params.get("transport"), Some("tcp"));
        assert_eq!(params.get("x"), Some("y"));
    }

    #[test]
    fn test_parse_flags_and_empty_tokens() {
        let params: Params = ";;rport;;branch=z9hG4bK".parse().unwrap();
        assert_eq!(params.get("rport"), Some(""));
        assert_eq!(params.get("branch"), Some("z9hG4bK"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_parse_lenient_keeps_good_pairs() {
        let (params, err) = Params::parse_lenient("ok=1;%ZZ=2;bad=%4;fine=3");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("ok"), Some("1"));
        assert_eq!(params.get("fine"), Some("3"));
        assert!(matches!(err, Some(Error::MalformedUriComponent { .. })));
        assert!("ok=1;%ZZ=2".parse::<Params>().is_err());
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: Params = "x=1;y=2".parse().unwrap();
        let b: Params = "y=2;x=1".parse().unwrap();
        assert_eq!(a, b);
    }
}
