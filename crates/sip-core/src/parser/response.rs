use std::str;
use std::str::FromStr;

use nom::{
    bytes::complete::{tag, take_while1, take_while_m_n},
    character::complete::space1,
    combinator::{map_res, opt, rest},
    error::{Error as NomError, ErrorKind},
    sequence::preceded,
};

use crate::types::status::StatusCode;
use crate::types::version::Version;
use super::ParseResult;

/// Parser for a SIP status line without its CRLF (RFC 3261 Section 7.2)
///
/// ABNF Grammar:
/// Status-Line =  SIP-Version SP Status-Code SP Reason-Phrase CRLF
/// Status-Code =  3DIGIT
///
/// An empty reason phrase is accepted with or without the second SP.
pub fn parse_status_line(input: &[u8]) -> ParseResult<(Version, StatusCode, String)> {
    let (input, version) = map_res(
        map_res(take_while1(|c: u8| c != b' '), str::from_utf8),
        Version::from_str,
    )(input)?;
    let (input, _) = space1(input)?;

    let before_code = input;
    let (input, code) = map_res(
        map_res(take_while_m_n(3, 3, |c: u8| c.is_ascii_digit()), str::from_utf8),
        |s: &str| s.parse::<u16>(),
    )(input)?;
    let status = StatusCode::from_u16(code)
        .map_err(|_| nom::Err::Failure(NomError::new(before_code, ErrorKind::Verify)))?;

    let (input, reason) = opt(preceded(tag(&b" "[..]), map_res(rest, str::from_utf8)))(input)?;
    if reason.is_none() && !input.is_empty() {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::Space)));
    }

    Ok((input, (version, status, reason.unwrap_or("").trim().to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line() {
        let (rem, (version, status, reason)) =
            parse_status_line(b"SIP/2.0 422 Session Interval Too Small").unwrap();
        assert!(rem.is_empty());
        assert_eq!(version, Version::sip_2_0());
        assert_eq!(status, StatusCode::SessionIntervalTooSmall);
        assert_eq!(reason, "Session Interval Too Small");
    }

    #[test]
    fn test_status_line_without_reason() {
        let (_, (_, status, reason)) = parse_status_line(b"SIP/2.0 180").unwrap();
        assert_eq!(status, StatusCode::Ringing);
        assert_eq!(reason, "");
    }

    #[test]
    fn test_bad_status_lines() {
        assert!(parse_status_line(b"SIP/2.0 99 Too Low").is_err());
        assert!(parse_status_line(b"SIP/2.0 2000 OK").is_err());
        assert!(matches!(parse_status_line(b"SIP/2.0 700 Nope"), Err(nom::Err::Failure(_))));
        assert!(parse_status_line(b"HTTP/1.1 200 OK").is_err());
    }
}
