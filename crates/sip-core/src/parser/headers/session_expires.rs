// Parser for the Session-Expires header (RFC 4028 Section 4)
// Session-Expires  = ("Session-Expires" / "x") HCOLON delta-seconds
//                    *(SEMI se-params)
// se-params        = refresher-param / generic-param
// refresher-param  = "refresher" EQUAL  ("uas" / "uac")

use nom::error::{Error as NomError, ErrorKind};

use crate::parser::common::{delta_seconds, semi_params};
use crate::parser::whitespace::sws;
use crate::parser::ParseResult;
use crate::types::param::Param;
use crate::types::session_expires::Refresher;

/// Parses a Session-Expires value into its interval, refresher and remaining parameters
///
/// A `refresher` parameter with a value other than `uac`/`uas` is a hard failure.
pub fn parse_session_expires(input: &[u8]) -> ParseResult<(u32, Option<Refresher>, Vec<Param>)> {
    let start = input;
    let (input, _) = sws(input)?;
    let (input, delta) = delta_seconds(input)?;
    let (input, all_params) = semi_params(input)?;

    let mut refresher = None;
    let mut params = Vec::with_capacity(all_params.len());
    for param in all_params {
        if param.is("refresher") {
            let parsed = match param.value() {
                Some(v) if v.eq_ignore_ascii_case("uac") => Refresher::Uac,
                Some(v) if v.eq_ignore_ascii_case("uas") => Refresher::Uas,
                _ => return Err(nom::Err::Failure(NomError::new(start, ErrorKind::Verify))),
            };
            refresher = Some(parsed);
        } else {
            params.push(param);
        }
    }

    Ok((input, (delta, refresher, params)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_interval() {
        let (rem, (delta, refresher, params)) = parse_session_expires(b"1000").unwrap();
        assert!(rem.is_empty());
        assert_eq!(delta, 1000);
        assert_eq!(refresher, None);
        assert!(params.is_empty());
    }

    #[test]
    fn test_refresher_and_extra_params() {
        let (rem, (delta, refresher, params)) =
            parse_session_expires(b" 2000 ; refresher=UAC;foo=bar").unwrap();
        assert!(rem.is_empty());
        assert_eq!(delta, 2000);
        assert_eq!(refresher, Some(Refresher::Uac));
        assert_eq!(params, vec![Param::new("foo", Some("bar"))]);
    }

    #[test]
    fn test_bad_refresher() {
        assert!(matches!(
            parse_session_expires(b"1800;refresher=proxy"),
            Err(nom::Err::Failure(_))
        ));
        assert!(parse_session_expires(b"1800;refresher").is_err());
        assert!(parse_session_expires(b"refresher=uac").is_err());
    }
}
