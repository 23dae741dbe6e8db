//! nom-based parsers over raw bytes.
//!
//! Start lines and typed header values are parsed with nom; the message
//! parser splits the header section and hands each value to the typed
//! headers on demand.

use nom::IResult;

pub mod common;
pub mod headers;
pub mod message;
pub mod request;
pub mod response;
pub mod separators;
pub mod whitespace;

/// Result type shared by all parsers in this module
pub type ParseResult<'a, O> = IResult<&'a [u8], O>;

pub use message::{message_length, parse_message, MAX_MESSAGE_SIZE};
pub use request::parse_request_line;
pub use response::parse_status_line;
