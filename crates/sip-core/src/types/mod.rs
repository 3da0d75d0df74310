//! # SIP Types
//!
//! The data model of the relay: URIs and parameters, typed header values,
//! the header collection and the request/response messages built from them.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`uri`] | [`Uri`] address model |
//! | [`param`] | [`Params`] key/value sets used by URIs and headers |
//! | [`method`] | [`Method`] request methods |
//! | [`status`] | [`StatusCode`] and reason phrases |
//! | [`via`] | [`Via`] routing hop |
//! | [`address`] | [`Address`] name-address for `From`/`To`/`Contact` |
//! | [`cseq`] | [`CSeq`] sequence counter |
//! | [`auth`] | [`Credentials`] authentication challenge/response |
//! | [`headers`] | [`HeaderName`], [`HeaderValue`], [`Headers`] |
//! | [`sip_request`] / [`sip_response`] / [`message`] | the messages |

pub mod address;
pub mod auth;
pub mod cseq;
pub mod headers;
pub mod message;
pub mod method;
pub mod param;
pub mod sip_request;
pub mod sip_response;
pub mod status;
pub mod uri;
pub mod via;

pub use address::Address;
pub use auth::Credentials;
pub use cseq::CSeq;
pub use headers::{HeaderName, HeaderValue, Headers};
pub use message::Message;
pub use method::Method;
pub use param::Params;
pub use sip_request::Request;
pub use sip_response::Response;
pub use status::StatusCode;
pub use uri::Uri;
pub use via::Via;
