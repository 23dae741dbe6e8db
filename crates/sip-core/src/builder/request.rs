use std::str::FromStr;

use bytes::Bytes;

use crate::error::Result;
use crate::types::address::{Address, Contact, From, To};
use crate::types::call_id::CallId;
use crate::types::cseq::CSeq;
use crate::types::headers::{Header, HeaderAccess, HeaderName, TypedHeaderTrait};
use crate::types::method::Method;
use crate::types::min_se::MinSE;
use crate::types::option_tag::{Require, Supported};
use crate::types::session_expires::{Refresher, SessionExpires};
use crate::types::sip_request::Request;
use crate::types::uri::Uri;
use crate::types::via::Via;

/// Fluent builder for [`Request`]
///
/// Headers are emitted in the order the methods are called. Max-Forwards
/// defaults to 70 and is added by [`SimpleRequestBuilder::build`] when unset.
///
/// ```rust
/// use sipconf_sip_core::builder::SimpleRequestBuilder;
/// use sipconf_sip_core::prelude::*;
///
/// let request = SimpleRequestBuilder::invite("sip:127.0.0.1:5060").unwrap()
///     .via("127.0.0.1:5070", "UDP", "z9hG4bK776asdhds")
///     .from("sip:alice@127.0.0.1", Some("1928301774")).unwrap()
///     .to("sip:127.0.0.1:5060", None).unwrap()
///     .call_id("a84b4c76e66710")
///     .cseq(1)
///     .session_expires(1000, None)
///     .min_se(100)
///     .build();
///
/// assert_eq!(request.cseq().unwrap().seq, 1);
/// assert_eq!(request.typed_header::<SessionExpires>().unwrap().unwrap().delta_seconds, 1000);
/// ```
#[derive(Debug, Clone)]
pub struct SimpleRequestBuilder {
    request: Request,
}

impl SimpleRequestBuilder {
    /// Starts a request for `method` targeting `uri`
    pub fn new(method: Method, uri: &str) -> Result<Self> {
        Ok(SimpleRequestBuilder {
            request: Request::new(method, Uri::from_str(uri)?),
        })
    }

    pub fn invite(uri: &str) -> Result<Self> {
        Self::new(Method::Invite, uri)
    }

    pub fn ack(uri: &str) -> Result<Self> {
        Self::new(Method::Ack, uri)
    }

    pub fn bye(uri: &str) -> Result<Self> {
        Self::new(Method::Bye, uri)
    }

    pub fn update(uri: &str) -> Result<Self> {
        Self::new(Method::Update, uri)
    }

    /// Starts from an existing request, keeping its headers
    pub fn from_request(request: Request) -> Self {
        SimpleRequestBuilder { request }
    }

    /// Appends a `SIP/2.0/<transport>` Via with the given sent-by and branch
    pub fn via(mut self, sent_by: &str, transport: &str, branch: &str) -> Self {
        let (host, port) = sent_by
            .rsplit_once(':')
            .and_then(|(host, port)| port.parse::<u16>().ok().map(|port| (host, Some(port))))
            .unwrap_or((sent_by, None));
        self.request.add_header(Via::new(transport, host, port, branch).to_header());
        self
    }

    pub fn from(mut self, uri: &str, tag: Option<&str>) -> Result<Self> {
        let mut from = From::new(Address::new(Uri::from_str(uri)?));
        if let Some(tag) = tag {
            from.set_tag(tag);
        }
        self.request.add_header(from.to_header());
        Ok(self)
    }

    pub fn to(mut self, uri: &str, tag: Option<&str>) -> Result<Self> {
        let mut to = To::new(Address::new(Uri::from_str(uri)?));
        if let Some(tag) = tag {
            to.set_tag(tag);
        }
        self.request.add_header(to.to_header());
        Ok(self)
    }

    pub fn contact(mut self, uri: &str) -> Result<Self> {
        let contact = Contact::new(Address::new(Uri::from_str(uri)?));
        self.request.add_header(contact.to_header());
        Ok(self)
    }

    pub fn call_id(mut self, call_id: &str) -> Self {
        self.request.add_header(CallId::new(call_id).to_header());
        self
    }

    /// CSeq with the request's own method
    pub fn cseq(mut self, seq: u32) -> Self {
        let cseq = CSeq::new(seq, self.request.method.clone());
        self.request.add_header(cseq.to_header());
        self
    }

    pub fn max_forwards(mut self, hops: u8) -> Self {
        self.request.set_header(Header::new(HeaderName::MaxForwards, hops.to_string()));
        self
    }

    pub fn supported(mut self, tags: &[&str]) -> Self {
        self.request.add_header(Supported::new(tags.iter().copied()).to_header());
        self
    }

    pub fn require(mut self, tags: &[&str]) -> Self {
        self.request.add_header(Require::new(tags.iter().copied()).to_header());
        self
    }

    pub fn session_expires(mut self, delta_seconds: u32, refresher: Option<Refresher>) -> Self {
        self.request
            .set_typed_header(&SessionExpires::new(delta_seconds, refresher));
        self
    }

    pub fn min_se(mut self, delta_seconds: u32) -> Self {
        self.request.set_typed_header(&MinSE::new(delta_seconds));
        self
    }

    /// Appends an arbitrary header
    pub fn header(mut self, header: Header) -> Self {
        self.request.add_header(header);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.request.body = body.into();
        self
    }

    pub fn build(mut self) -> Request {
        if !self.request.has_header(&HeaderName::MaxForwards) {
            self.request.add_header(Header::new(HeaderName::MaxForwards, "70"));
        }
        self.request
    }
}
