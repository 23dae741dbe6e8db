// Parser for the CSeq header (RFC 3261 Section 20.16)
// CSeq  =  "CSeq" HCOLON 1*DIGIT LWS Method

use std::str::FromStr;

use nom::{
    character::complete::digit1,
    combinator::map_res,
    error::{Error as NomError, ErrorKind},
};

use crate::parser::common::token;
use crate::parser::whitespace::{lws, sws};
use crate::parser::ParseResult;
use crate::types::method::Method;

/// Parses `1*DIGIT LWS Method`
pub fn parse_cseq(input: &[u8]) -> ParseResult<(u32, Method)> {
    let (input, _) = sws(input)?;
    let (input, seq) = map_res(map_res(digit1, std::str::from_utf8), |s: &str| s.parse::<u32>())(input)?;
    let (input, _) = lws(input)?;
    let before_method = input;
    let (input, method) = token(input)?;
    let method = Method::from_str(method)
        .map_err(|_| nom::Err::Error(NomError::new(before_method, ErrorKind::Tag)))?;
    Ok((input, (seq, method)))
}
