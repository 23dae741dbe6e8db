//! # SIP Response Message

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::headers::{Header, HeaderAccess};
use crate::types::sip_request::write_message;
use crate::types::status::StatusCode;
use crate::types::version::Version;

/// A SIP response
///
/// ```rust
/// use sipconf_sip_core::prelude::*;
///
/// let response = Response::new(StatusCode::SessionIntervalTooSmall)
///     .with_header(Header::text(HeaderName::MinSE, "2000"));
/// assert_eq!(response.reason_phrase(), "Session Interval Too Small");
/// assert!(response.to_string().starts_with("SIP/2.0 422 Session Interval Too Small\r\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// The SIP version
    pub version: Version,
    /// Status code
    pub status: StatusCode,
    /// Reason phrase as sent; `None` uses the canonical phrase
    pub reason: Option<String>,
    /// Headers in wire order
    pub headers: Vec<Header>,
    /// The message body
    pub body: Bytes,
}

impl Response {
    /// Creates a SIP/2.0 response with the canonical reason phrase
    pub fn new(status: StatusCode) -> Self {
        Response {
            version: Version::sip_2_0(),
            status,
            reason: None,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Numeric status code
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn reason_phrase(&self) -> &str {
        self.reason.as_deref().unwrap_or_else(|| self.status.reason_phrase())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the response for the wire
    pub fn to_bytes(&self) -> Bytes {
        let start_line = format!("{} {} {}", self.version, self.status.as_u16(), self.reason_phrase());
        write_message(&start_line, &self.headers, &self.body)
    }
}

impl HeaderAccess for Response {
    fn headers(&self) -> &[Header] {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut Vec<Header> {
        &mut self.headers
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.to_bytes()))
    }
}
