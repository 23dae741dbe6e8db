//! Separator wrappers with surrounding SWS, e.g. `SEMI = SWS ";" SWS`.

use nom::{
    bytes::complete::tag,
    combinator::recognize,
    sequence::tuple,
};

use super::whitespace::sws;
use super::ParseResult;

pub fn semi(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(tuple((sws, tag(&b";"[..]), sws)))(input)
}

pub fn equal(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(tuple((sws, tag(&b"="[..]), sws)))(input)
}

pub fn comma(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(tuple((sws, tag(&b","[..]), sws)))(input)
}

pub fn slash(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(tuple((sws, tag(&b"/"[..]), sws)))(input)
}
