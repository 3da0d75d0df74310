//! Error types for SIP message parsing and serialization

use thiserror::Error;

/// A type alias for handling `Result`s with `Error`
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or building SIP messages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A URI could not be parsed
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// A component of a URI (user info, parameter, query) is malformed
    #[error("Malformed URI component '{component}': {message}")]
    MalformedUriComponent {
        /// The URI component that failed
        component: String,
        /// What went wrong
        message: String,
    },

    /// A header value could not be parsed by its dedicated parser
    #[error("Invalid {name} header: {message}")]
    InvalidHeader {
        /// Canonical header name
        name: String,
        /// What went wrong
        message: String,
    },

    /// A header line carries no `name: value` separator
    #[error("Malformed header line: {0}")]
    MalformedHeaderLine(String),

    /// The request line or status line is malformed
    #[error("Invalid start line: {0}")]
    InvalidStartLine(String),

    /// A method token is empty or contains illegal characters
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    /// A status code is not a three digit number
    #[error("Invalid status code: {0}")]
    InvalidStatusCode(u16),

    /// The datagram ended before the declared body length was read
    #[error("Short body: expected {expected} bytes, got {actual}")]
    ShortBody {
        /// Value of the Content-Length header
        expected: usize,
        /// Number of bytes available
        actual: usize,
    },

    /// Generic parse failure
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl Error {
    /// Shorthand for building an [`Error::InvalidHeader`]
    pub fn invalid_header(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidHeader {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for errors raised while reading the wire format
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedHeaderLine(_)
                | Error::InvalidStartLine(_)
                | Error::ShortBody { .. }
                | Error::InvalidMethod(_)
                | Error::InvalidStatusCode(_)
        )
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::ParseError(format!("Invalid UTF-8: {}", err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::ParseError(format!("Invalid integer: {}", err))
    }
}

impl<E: std::fmt::Debug> From<nom::Err<E>> for Error {
    fn from(err: nom::Err<E>) -> Self {
        match err {
            nom::Err::Incomplete(_) => Error::ParseError("Incomplete input".to_string()),
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                Error::ParseError(format!("{:?}", e))
            }
        }
    }
}
