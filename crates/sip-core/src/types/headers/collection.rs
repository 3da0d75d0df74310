use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::header_name::HeaderName;
use super::header_value::HeaderValue;
use crate::types::address::Address;
use crate::types::cseq::CSeq;
use crate::types::via::Via;

/// Ordered header collection with one value per canonical name
///
/// Setting a header that already exists replaces its value but keeps its
/// original position, so a relayed message lists its headers in the order
/// they arrived.
///
/// # Examples
///
/// ```rust
/// use sipbridge_sip_core::types::headers::{HeaderName, HeaderValue, Headers};
///
/// let mut headers = Headers::new();
/// headers.set(HeaderName::VIA, HeaderValue::text("SIP/2.0/UDP a.com"));
/// headers.set(HeaderName::CALL_ID, HeaderValue::text("abc"));
/// headers.set("v", HeaderValue::text("SIP/2.0/UDP b.com"));
///
/// let names: Vec<&str> = headers.iter().map(|(name, _)| name.as_str()).collect();
/// assert_eq!(names, ["Via", "Call-ID"]);
/// assert_eq!(headers.get("via").unwrap().to_string(), "SIP/2.0/UDP b.com");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers(IndexMap<HeaderName, HeaderValue>);

impl Headers {
    pub fn new() -> Self {
        Headers(IndexMap::new())
    }

    pub fn get(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.0.get(&HeaderName::new(name.as_ref()))
    }

    pub fn get_mut(&mut self, name: impl AsRef<str>) -> Option<&mut HeaderValue> {
        self.0.get_mut(&HeaderName::new(name.as_ref()))
    }

    /// Sets `name` to `value`, keeping the position of an existing entry
    pub fn set(&mut self, name: impl Into<HeaderName>, value: impl Into<HeaderValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: impl AsRef<str>) -> Option<HeaderValue> {
        self.0.shift_remove(&HeaderName::new(name.as_ref()))
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.0.contains_key(&HeaderName::new(name.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.0.iter()
    }

    /// Typed `Via` value
    pub fn via(&self) -> Option<&Via> {
        self.get(HeaderName::VIA).and_then(HeaderValue::as_via)
    }

    /// Typed address value of `From`, `To`, `Contact` or any header that
    /// parsed into an address
    pub fn address(&self, name: impl AsRef<str>) -> Option<&Address> {
        self.get(name).and_then(HeaderValue::as_address)
    }

    pub fn address_mut(&mut self, name: impl AsRef<str>) -> Option<&mut Address> {
        self.get_mut(name).and_then(HeaderValue::as_address_mut)
    }

    pub fn cseq(&self) -> Option<&CSeq> {
        self.get(HeaderName::CSEQ).and_then(HeaderValue::as_sequence)
    }

    pub fn max_forwards(&self) -> Option<i32> {
        self.get(HeaderName::MAX_FORWARDS).and_then(HeaderValue::as_max_forwards)
    }

    /// Raw `Call-ID` text
    pub fn call_id(&self) -> Option<&str> {
        self.get(HeaderName::CALL_ID).and_then(HeaderValue::as_text)
    }

    /// Declared `Content-Length`, if present and numeric
    pub fn content_length(&self) -> Option<usize> {
        self.get(HeaderName::CONTENT_LENGTH)?.to_string().trim().parse().ok()
    }

    /// Writes the header block, replacing `Content-Length` with
    /// `content_length` (in place if present, appended otherwise), and the
    /// terminating blank line.
    pub fn write_with_content_length(&self, out: &mut String, content_length: usize) {
        let mut wrote_length = false;
        for (name, value) in self.0.iter() {
            if *name == HeaderName::CONTENT_LENGTH {
                out.push_str(&format!("{}: {}\r\n", name, content_length));
                wrote_length = true;
            } else {
                out.push_str(&format!("{}: {}\r\n", name, value));
            }
        }
        if !wrote_length {
            out.push_str(&format!("{}: {}\r\n", HeaderName::CONTENT_LENGTH, content_length));
        }
        out.push_str("\r\n");
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.0.iter() {
            write!(f, "{}: {}\r\n", name, value)?;
        }
        f.write_str("\r\n")
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a HeaderName, &'a HeaderValue);
    type IntoIter = indexmap::map::Iter<'a, HeaderName, HeaderValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_preserves_position() {
        let mut headers = Headers::new();
        headers.set("From", "a");
        headers.set("To", "b");
        headers.set("from", "c");
        assert_eq!(headers.to_string(), "From: c\r\nTo: b\r\n\r\n");
    }

    #[test]
    fn test_remove_and_contains() {
        let mut headers = Headers::new();
        headers.set(HeaderName::CALL_ID, "abc");
        assert!(headers.contains("i"));
        assert_eq!(headers.call_id(), Some("abc"));
        assert!(headers.remove("call-id").is_some());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_content_length_is_rewritten_in_place() {
        let mut headers = Headers::new();
        headers.set("Content-Length", "999");
        headers.set("Call-ID", "x");
        let mut out = String::new();
        headers.write_with_content_length(&mut out, 4);
        assert_eq!(out, "Content-Length: 4\r\nCall-ID: x\r\n\r\n");

        headers.remove("Content-Length");
        let mut out = String::new();
        headers.write_with_content_length(&mut out, 0);
        assert_eq!(out, "Call-ID: x\r\nContent-Length: 0\r\n\r\n");
    }

    #[test]
    fn test_clone_is_independent() {
        let mut headers = Headers::new();
        headers.set(HeaderName::MAX_FORWARDS, HeaderValue::MaxForwards(70));
        let mut copy = headers.clone();
        copy.set(HeaderName::MAX_FORWARDS, HeaderValue::MaxForwards(69));
        copy.set("X-Extra", "1");
        assert_eq!(headers.max_forwards(), Some(70));
        assert_eq!(headers.len(), 1);
    }
}
