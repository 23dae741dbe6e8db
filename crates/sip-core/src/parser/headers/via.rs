// Parser for the Via header (RFC 3261 Section 20.42)
// Via          = ( "Via" / "v" ) HCOLON via-parm *(COMMA via-parm)
// via-parm     = sent-protocol LWS sent-by *( SEMI via-params )
// sent-protocol = protocol-name SLASH protocol-version SLASH transport
// sent-by      = host [ COLON port ]

use std::str;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::digit1,
    combinator::{map_res, opt, recognize},
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
};

use crate::parser::common::{semi_params, token};
use crate::parser::separators::{comma, slash};
use crate::parser::whitespace::{lws, sws};
use crate::parser::ParseResult;
use crate::types::via::{SentProtocol, ViaHeader};

fn is_hostname_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'.' || c == b'_'
}

/// host = hostname / IPv4address / IPv6reference
pub fn host(input: &[u8]) -> ParseResult<&str> {
    map_res(
        alt((
            recognize(delimited(
                tag(&b"["[..]),
                take_while1(|c: u8| c.is_ascii_hexdigit() || c == b':' || c == b'.'),
                tag(&b"]"[..]),
            )),
            take_while1(is_hostname_char),
        )),
        str::from_utf8,
    )(input)
}

/// port = 1*DIGIT
pub fn port(input: &[u8]) -> ParseResult<u16> {
    map_res(map_res(digit1, str::from_utf8), |s: &str| s.parse::<u16>())(input)
}

fn sent_protocol(input: &[u8]) -> ParseResult<SentProtocol> {
    let (input, (name, _, version, _, transport)) =
        tuple((token, slash, token, slash, token))(input)?;
    Ok((
        input,
        SentProtocol {
            name: name.to_string(),
            version: version.to_string(),
            transport: transport.to_string(),
        },
    ))
}

fn via_parm(input: &[u8]) -> ParseResult<ViaHeader> {
    let (input, sent_protocol) = sent_protocol(input)?;
    let (input, _) = lws(input)?;
    let (input, host) = host(input)?;
    let (input, port) = opt(preceded(tag(&b":"[..]), port))(input)?;
    let (input, params) = semi_params(input)?;
    Ok((
        input,
        ViaHeader {
            sent_protocol,
            sent_by_host: host.to_string(),
            sent_by_port: port,
            params,
        },
    ))
}

/// Parses a Via header value into its comma-separated entries
pub fn parse_via(input: &[u8]) -> ParseResult<Vec<ViaHeader>> {
    preceded(sws, separated_list1(comma, via_parm))(input)
}
