// Parser for the Min-SE header (RFC 4028 Section 5)
// Min-SE  =  "Min-SE" HCOLON delta-seconds *(SEMI generic-param)

use crate::parser::common::{delta_seconds, semi_params};
use crate::parser::whitespace::sws;
use crate::parser::ParseResult;
use crate::types::param::Param;

/// Parses a Min-SE value
pub fn parse_min_se(input: &[u8]) -> ParseResult<(u32, Vec<Param>)> {
    let (input, _) = sws(input)?;
    let (input, delta) = delta_seconds(input)?;
    let (input, params) = semi_params(input)?;
    Ok((input, (delta, params)))
}
