//! Responses built from a received request

use std::str::FromStr;

use sipconf_sip_core::builder::SimpleResponseBuilder;
use sipconf_sip_core::types::{Contact, Header, HeaderAccess, Request, Response, StatusCode, TypedHeaderTrait};

use crate::error::{Result, ScenarioError};

/// Builds the peer's response to `request`
///
/// Via, From, To, Call-ID and CSeq are copied, the To tag is added when the
/// request has none, then Contact and each `Name: value` line of `extra`
/// are appended.
pub fn build_response(
    request: &Request,
    status: StatusCode,
    to_tag: &str,
    contact: &Contact,
    extra: &[String],
) -> Result<Response> {
    let mut response = SimpleResponseBuilder::response_from_request(request, status)
        .to_tag(to_tag)
        .header(contact.to_header())
        .build();
    for line in extra {
        response.add_header(parse_header_line(line)?);
    }
    Ok(response)
}

fn parse_header_line(line: &str) -> Result<Header> {
    Header::from_str(line).map_err(|e| ScenarioError::ResponseHeader {
        line: line.to_string(),
        reason: e.to_string(),
    })
}
