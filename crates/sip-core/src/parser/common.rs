//! Grammar elements shared by the start-line and header parsers.

use std::str;

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::digit1,
    combinator::{map_res, opt},
    error::{Error as NomError, ErrorKind},
    multi::many0,
    sequence::preceded,
};

use super::separators::{equal, semi};
use super::ParseResult;
use crate::types::param::Param;

/// token chars: alphanum / "-" / "." / "!" / "%" / "*" / "_" / "+" / "`" / "'" / "~"
pub fn is_token_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || b"-.!%*_+`'~".contains(&c)
}

fn is_value_char(c: u8) -> bool {
    // gen-value = token / host / quoted-string; host adds ':' and IPv6 brackets
    is_token_char(c) || c == b':' || c == b'[' || c == b']'
}

/// token = 1*(token chars)
pub fn token(input: &[u8]) -> ParseResult<&str> {
    map_res(take_while1(is_token_char), str::from_utf8)(input)
}

/// quoted-string = DQUOTE *(qdtext / quoted-pair) DQUOTE
///
/// Returns the string including its quotes.
pub fn quoted_string(input: &[u8]) -> ParseResult<&str> {
    if input.first() != Some(&b'"') {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::Char)));
    }
    let mut i = 1;
    while i < input.len() {
        match input[i] {
            b'\\' => i += 2,
            b'"' => {
                let quoted = str::from_utf8(&input[..=i])
                    .map_err(|_| nom::Err::Error(NomError::new(input, ErrorKind::Char)))?;
                return Ok((&input[i + 1..], quoted));
            }
            _ => i += 1,
        }
    }
    Err(nom::Err::Error(NomError::new(input, ErrorKind::Char)))
}

/// gen-value = token / host / quoted-string
pub fn gen_value(input: &[u8]) -> ParseResult<&str> {
    alt((quoted_string, map_res(take_while1(is_value_char), str::from_utf8)))(input)
}

/// generic-param = token [ EQUAL gen-value ]
pub fn generic_param(input: &[u8]) -> ParseResult<Param> {
    let (input, key) = token(input)?;
    let (input, value) = opt(preceded(equal, gen_value))(input)?;
    Ok((input, Param::new(key, value)))
}

/// *( SEMI generic-param )
pub fn semi_params(input: &[u8]) -> ParseResult<Vec<Param>> {
    many0(preceded(semi, generic_param))(input)
}

/// delta-seconds = 1*DIGIT
pub fn delta_seconds(input: &[u8]) -> ParseResult<u32> {
    map_res(map_res(digit1, str::from_utf8), |s: &str| s.parse::<u32>())(input)
}

/// Turns a nom failure into a codec error naming what was being parsed
pub(crate) fn nom_error(what: &str, err: nom::Err<NomError<&[u8]>>) -> crate::error::Error {
    let detail = match err {
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            format!("{:?} at \"{}\"", e.code, String::from_utf8_lossy(e.input))
        }
    };
    crate::error::Error::ParseError(format!("Failed to parse {}: {}", what, detail))
}

/// Runs a parser over a complete header value, rejecting trailing input
pub(crate) fn parse_all<'a, T>(
    what: &str,
    input: &'a [u8],
    parser: impl FnOnce(&'a [u8]) -> ParseResult<'a, T>,
) -> crate::error::Result<T> {
    let (rem, value) = parser(input).map_err(|e| nom_error(what, e))?;
    let (rem, _) = super::whitespace::sws(rem).map_err(|e| nom_error(what, e))?;
    if !rem.is_empty() {
        return Err(crate::error::Error::ParseError(format!(
            "Trailing characters after parsing {}: \"{}\"",
            what,
            String::from_utf8_lossy(rem)
        )));
    }
    Ok(value)
}
