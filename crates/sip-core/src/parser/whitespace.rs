//! Whitespace primitives from RFC 3261 Section 25.1.
//!
//! Header values reach these parsers after line folding has been undone by
//! the message parser, so LWS reduces to runs of SP / HTAB here.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    combinator::recognize,
};

use super::ParseResult;

fn is_wsp(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

/// One or more SP / HTAB
pub fn lws(input: &[u8]) -> ParseResult<&[u8]> {
    take_while1(is_wsp)(input)
}

/// Optional whitespace, SWS = [LWS]
pub fn sws(input: &[u8]) -> ParseResult<&[u8]> {
    take_while(is_wsp)(input)
}

/// CRLF, accepting a bare LF as well
pub fn crlf(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(alt((tag(&b"\r\n"[..]), tag(&b"\n"[..]))))(input)
}
