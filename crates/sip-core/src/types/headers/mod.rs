//! # SIP Headers
//!
//! Header names, typed header values and the ordered collection that holds
//! them.
//!
//! - [`HeaderName`]: canonical, case-insensitive header name
//! - [`HeaderValue`]: closed set of typed values (`Via`, addresses, `CSeq`,
//!   credentials, lists, hop count, opaque text)
//! - [`Headers`]: insertion-ordered collection with unique names

mod collection;
mod header_name;
mod header_value;

pub use collection::Headers;
pub use header_name::HeaderName;
pub use header_value::HeaderValue;
