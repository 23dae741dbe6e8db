use bytes::Bytes;

use crate::types::address::To;
use crate::types::headers::{Header, HeaderAccess, HeaderName, TypedHeaderTrait};
use crate::types::min_se::MinSE;
use crate::types::option_tag::{Require, Supported};
use crate::types::session_expires::{Refresher, SessionExpires};
use crate::types::sip_request::Request;
use crate::types::sip_response::Response;
use crate::types::status::StatusCode;

/// Fluent builder for [`Response`]
///
/// ```rust
/// use sipconf_sip_core::builder::{SimpleRequestBuilder, SimpleResponseBuilder};
/// use sipconf_sip_core::prelude::*;
///
/// let request = SimpleRequestBuilder::invite("sip:127.0.0.1").unwrap()
///     .via("127.0.0.1:5070", "UDP", "z9hG4bK1")
///     .from("sip:alice@127.0.0.1", Some("a")).unwrap()
///     .to("sip:127.0.0.1", None).unwrap()
///     .call_id("c1")
///     .cseq(1)
///     .build();
///
/// let response = SimpleResponseBuilder::response_from_request(&request, StatusCode::SessionIntervalTooSmall)
///     .to_tag("b")
///     .min_se(2000)
///     .build();
/// assert_eq!(response.to().unwrap().tag(), Some("b"));
/// assert_eq!(response.call_id().unwrap().as_str(), "c1");
/// ```
#[derive(Debug, Clone)]
pub struct SimpleResponseBuilder {
    response: Response,
}

impl SimpleResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        SimpleResponseBuilder {
            response: Response::new(status),
        }
    }

    /// Starts a response that copies Via, From, To, Call-ID and CSeq from `request`
    pub fn response_from_request(request: &Request, status: StatusCode) -> Self {
        let mut response = Response::new(status);
        for header in request.headers() {
            if matches!(
                header.name,
                HeaderName::Via | HeaderName::From | HeaderName::To | HeaderName::CallId | HeaderName::CSeq
            ) {
                response.add_header(header.clone());
            }
        }
        SimpleResponseBuilder { response }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.response.reason = Some(reason.into());
        self
    }

    /// Sets the To tag unless the To header already carries one
    pub fn to_tag(mut self, tag: &str) -> Self {
        if let Ok(Some(to)) = self.response.typed_header::<To>() {
            if to.tag().is_none() {
                self.response.set_typed_header(&to.with_tag(tag));
            }
        }
        self
    }

    pub fn supported(mut self, tags: &[&str]) -> Self {
        self.response.set_typed_header(&Supported::new(tags.iter().copied()));
        self
    }

    pub fn require(mut self, tags: &[&str]) -> Self {
        self.response.set_typed_header(&Require::new(tags.iter().copied()));
        self
    }

    pub fn session_expires(mut self, delta_seconds: u32, refresher: Option<Refresher>) -> Self {
        self.response
            .set_typed_header(&SessionExpires::new(delta_seconds, refresher));
        self
    }

    pub fn min_se(mut self, delta_seconds: u32) -> Self {
        self.response.set_typed_header(&MinSE::new(delta_seconds));
        self
    }

    pub fn header(mut self, header: Header) -> Self {
        self.response.add_header(header);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.response.body = body.into();
        self
    }

    pub fn build(self) -> Response {
        self.response
    }
}
