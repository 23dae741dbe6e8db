//! # SIP Request Message
//!
//! The [`Request`] type: a request-line (method, Request-URI, version), an
//! ordered header list and an optional body.
//!
//! ## Examples
//!
//! ```rust
//! use sipconf_sip_core::prelude::*;
//! use std::str::FromStr;
//!
//! let request = Request::new(Method::Invite, Uri::from_str("sip:127.0.0.1:5060").unwrap())
//!     .with_header(Header::text(HeaderName::SessionExpires, "1000"))
//!     .with_body("v=0\r\n");
//!
//! let text = request.to_string();
//! assert!(text.starts_with("INVITE sip:127.0.0.1:5060 SIP/2.0\r\n"));
//! assert!(text.contains("Session-Expires: 1000\r\n"));
//! assert!(text.contains("Content-Length: 5\r\n"));
//! ```

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::types::headers::{Header, HeaderAccess, HeaderName};
use crate::types::method::Method;
use crate::types::uri::Uri;
use crate::types::version::Version;

/// A SIP request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// The SIP method
    pub method: Method,
    /// The Request-URI
    pub uri: Uri,
    /// The SIP version
    pub version: Version,
    /// Headers in wire order
    pub headers: Vec<Header>,
    /// The message body
    pub body: Bytes,
}

impl Request {
    /// Creates a SIP/2.0 request with no headers or body
    pub fn new(method: Method, uri: Uri) -> Self {
        Request {
            method,
            uri,
            version: Version::sip_2_0(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Appends a header
    pub fn with_header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    /// Replaces the body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the request for the wire
    ///
    /// Content-Length always reflects the actual body; any stored value is ignored.
    pub fn to_bytes(&self) -> Bytes {
        let start_line = format!("{} {} {}", self.method, self.uri, self.version);
        write_message(&start_line, &self.headers, &self.body)
    }
}

impl HeaderAccess for Request {
    fn headers(&self) -> &[Header] {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut Vec<Header> {
        &mut self.headers
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.to_bytes()))
    }
}

/// Writes start line, headers, a recomputed Content-Length and the body
pub(crate) fn write_message(start_line: &str, headers: &[Header], body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(256 + body.len());
    buf.put_slice(start_line.as_bytes());
    buf.put_slice(b"\r\n");
    for header in headers.iter().filter(|h| h.name != HeaderName::ContentLength) {
        buf.put_slice(header.to_string().as_bytes());
        buf.put_slice(b"\r\n");
    }
    buf.put_slice(format!("{}: {}\r\n\r\n", HeaderName::ContentLength, body.len()).as_bytes());
    buf.put_slice(body);
    buf.freeze()
}
