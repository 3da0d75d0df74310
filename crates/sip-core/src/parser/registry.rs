//! Header parser registry.
//!
//! Maps canonical header names to the parser producing their typed value.
//! A registry is an ordinary value owned by whoever decodes messages, so two
//! decoders can carry different extensions without interfering.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::parser::headers::{
    parse_address, parse_cseq, parse_credentials, parse_list, parse_max_forwards, parse_via,
};
use crate::types::headers::{HeaderName, HeaderValue};

/// A header value parser
pub type HeaderParser = Arc<dyn Fn(&str) -> Result<HeaderValue> + Send + Sync>;

/// Name to parser lookup used by the message decoder
///
/// `HeaderParserRegistry::default()` knows `Via`, `From`, `To`, `Contact`,
/// `CSeq`, `Max-Forwards`, the capability lists and the authentication
/// headers. Every other header is kept as opaque text.
///
/// # Examples
///
/// ```rust
/// use sipbridge_sip_core::parser::registry::HeaderParserRegistry;
/// use sipbridge_sip_core::types::headers::{HeaderName, HeaderValue};
///
/// let mut registry = HeaderParserRegistry::default();
/// registry.register("Require", |s| {
///     Ok(HeaderValue::List(s.split(',').map(|v| v.trim().to_string()).collect()))
/// });
///
/// let value = registry.parse(&HeaderName::REQUIRE, "timer, 100rel").unwrap();
/// assert_eq!(value.as_list().map(|l| l.len()), Some(2));
///
/// let value = registry.parse(&HeaderName::new("X-Anything"), "raw").unwrap();
/// assert_eq!(value.as_text(), Some("raw"));
/// ```
#[derive(Clone)]
pub struct HeaderParserRegistry {
    parsers: HashMap<HeaderName, HeaderParser>,
}

impl HeaderParserRegistry {
    /// A registry without any parser; every header stays opaque text
    pub fn empty() -> Self {
        HeaderParserRegistry {
            parsers: HashMap::new(),
        }
    }

    /// Registers `parser` for `name`, replacing any previous parser
    pub fn register<F>(&mut self, name: impl Into<HeaderName>, parser: F)
    where
        F: Fn(&str) -> Result<HeaderValue> + Send + Sync + 'static,
    {
        self.parsers.insert(name.into(), Arc::new(parser));
    }

    pub fn unregister(&mut self, name: impl AsRef<str>) -> bool {
        self.parsers.remove(&HeaderName::new(name.as_ref())).is_some()
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.parsers.contains_key(&HeaderName::new(name.as_ref()))
    }

    /// Parses `value` with the parser registered for `name`, falling back to
    /// opaque text for unregistered names.
    pub fn parse(&self, name: &HeaderName, value: &str) -> Result<HeaderValue> {
        match self.parsers.get(name) {
            Some(parser) => parser(value),
            None => Ok(HeaderValue::Text(value.to_string())),
        }
    }

    /// Like [`HeaderParserRegistry::parse`], but keeps a value its parser
    /// rejects as opaque text.
    pub fn parse_lenient(&self, name: &HeaderName, value: &str) -> HeaderValue {
        match self.parse(name, value) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(header = %name, error = %e, "Keeping unparsable header as text");
                HeaderValue::Text(value.to_string())
            }
        }
    }
}

impl Default for HeaderParserRegistry {
    fn default() -> Self {
        let mut registry = HeaderParserRegistry::empty();
        registry.register(HeaderName::VIA, |s| parse_via(s).map(HeaderValue::Via));
        for name in [HeaderName::CONTACT, HeaderName::FROM, HeaderName::TO] {
            registry.register(name, |s| parse_address(s).map(HeaderValue::Address));
        }
        registry.register(HeaderName::CSEQ, |s| parse_cseq(s).map(HeaderValue::Sequence));
        for name in [HeaderName::ALLOW, HeaderName::SUPPORTED, HeaderName::ALLOW_EVENTS] {
            registry.register(name, |s| Ok(HeaderValue::List(parse_list(s))));
        }
        registry.register(HeaderName::MAX_FORWARDS, |s| {
            parse_max_forwards(s).map(HeaderValue::MaxForwards)
        });
        for name in [
            HeaderName::AUTHORIZATION,
            HeaderName::WWW_AUTHENTICATE,
            HeaderName::PROXY_AUTHORIZATION,
            HeaderName::PROXY_AUTHENTICATE,
        ] {
            registry.register(name, |s| parse_credentials(s).map(HeaderValue::Credentials));
        }
        registry
    }
}

impl fmt::Debug for HeaderParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.parsers.keys().map(HeaderName::as_str).collect();
        names.sort_unstable();
        f.debug_struct("HeaderParserRegistry").field("parsers", &names).finish()
    }
}
