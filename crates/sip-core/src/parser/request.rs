use std::str;
use std::str::FromStr;

use nom::{
    bytes::complete::take_while1,
    character::complete::space1,
    combinator::map_res,
};

use crate::types::method::Method;
use crate::types::uri::Uri;
use crate::types::version::Version;
use super::common::token;
use super::ParseResult;

/// Parser for a SIP request line without its CRLF (RFC 3261 Section 7.1)
///
/// ABNF Grammar:
/// Request-Line  =  Method SP Request-URI SP SIP-Version CRLF
pub fn parse_request_line(input: &[u8]) -> ParseResult<(Method, Uri, Version)> {
    let (input, method) = map_res(token, Method::from_str)(input)?;
    let (input, _) = space1(input)?;
    let (input, uri) = map_res(
        map_res(take_while1(|c: u8| c != b' '), str::from_utf8),
        Uri::from_str,
    )(input)?;
    let (input, _) = space1(input)?;
    let (input, version) = map_res(
        map_res(take_while1(|c: u8| !c.is_ascii_whitespace()), str::from_utf8),
        Version::from_str,
    )(input)?;
    Ok((input, (method, uri, version)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_line() {
        let (rem, (method, uri, version)) =
            parse_request_line(b"INVITE sip:127.0.0.1:5060 SIP/2.0").unwrap();
        assert!(rem.is_empty());
        assert_eq!(method, Method::Invite);
        assert_eq!(uri.port, Some(5060));
        assert_eq!(version, Version::sip_2_0());
    }

    #[test]
    fn test_extension_method() {
        let (_, (method, _, _)) = parse_request_line(b"PUBLISH sip:a@b SIP/2.0").unwrap();
        assert_eq!(method, Method::Extension("PUBLISH".to_string()));
    }

    #[test]
    fn test_bad_request_lines() {
        assert!(parse_request_line(b"INVITE sip:a@b").is_err());
        assert!(parse_request_line(b"INVITE  SIP/2.0").is_err());
        assert!(parse_request_line(b"INVITE nourl SIP/2.0").is_err());
        assert!(parse_request_line(b"INVITE sip:a@b SIP/x").is_err());
    }
}
