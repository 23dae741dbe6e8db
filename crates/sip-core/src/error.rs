//! Error types for the SIP codec.

use thiserror::Error;

/// A type alias for handling `Result`s with `Error`
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while parsing, building or inspecting SIP messages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Generic parse failure with a description of what was being parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Status code outside 100..=699
    #[error("Invalid status code: {0}")]
    InvalidStatusCode(u16),

    /// Method token that is not a valid SIP token
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    /// URI that could not be parsed
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// A header value that failed typed parsing
    #[error("Invalid {name} header: {reason}")]
    InvalidHeader {
        /// Canonical header name
        name: String,
        /// What was wrong with the value
        reason: String,
    },

    /// A header that the operation requires is absent
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// The body is shorter than the declared Content-Length
    #[error("Incomplete message: Content-Length {expected} but only {actual} body bytes")]
    IncompleteMessage {
        /// Declared Content-Length
        expected: usize,
        /// Bytes available after the header section
        actual: usize,
    },

    /// A framed message would exceed the stream size limit
    #[error("Message of {size} bytes exceeds the {limit} byte limit")]
    MessageTooLarge {
        /// Bytes the message needs, header section plus declared body
        size: usize,
        limit: usize,
    },

    /// Header section is not valid UTF-8
    #[error("Invalid UTF-8 in message: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidHeader`]
    pub fn invalid_header(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidHeader {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
