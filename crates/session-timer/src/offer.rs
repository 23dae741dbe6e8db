//! What a request asks for in terms of session timers

use sipconf_sip_core::types::{
    HeaderAccess, HeaderName, MinSE, Refresher, Request, SessionExpires, Supported, TIMER_OPTION_TAG,
};

use crate::error::Result;

/// Session-timer parameters carried by an INVITE or UPDATE
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTimerOffer {
    /// Requested Session-Expires, seconds
    pub session_expires: Option<u32>,
    /// Requested Min-SE, seconds
    pub min_se: Option<u32>,
    /// Refresher preference
    pub refresher: Option<Refresher>,
    /// `Supported: timer` present
    pub supported: bool,
    /// `Require: timer` present
    pub required: bool,
}

impl SessionTimerOffer {
    /// Reads the offer from a request
    ///
    /// Absent headers leave fields empty; malformed ones are errors.
    pub fn from_request(request: &Request) -> Result<Self> {
        let session_expires = request.typed_header::<SessionExpires>()?;
        let min_se = request.typed_header::<MinSE>()?;
        Ok(SessionTimerOffer {
            session_expires: session_expires.as_ref().map(|se| se.delta_seconds),
            min_se: min_se.map(|m| m.delta_seconds),
            refresher: session_expires.and_then(|se| se.refresher),
            supported: lists_option_tag(request, &HeaderName::Supported, TIMER_OPTION_TAG)?,
            required: lists_option_tag(request, &HeaderName::Require, TIMER_OPTION_TAG)?,
        })
    }

    /// Largest lower bound the request puts on the interval
    pub fn floor(&self, local_min_se: u32) -> u32 {
        self.min_se.unwrap_or(0).max(local_min_se)
    }
}

/// Whether any Supported/Require header named `name` lists `tag`
pub(crate) fn lists_option_tag<M: HeaderAccess>(message: &M, name: &HeaderName, tag: &str) -> Result<bool> {
    for header in message.headers_named(name) {
        // Supported and Require share the option-tag list grammar
        if header.value.parse::<Supported>()?.contains(tag) {
            return Ok(true);
        }
    }
    Ok(false)
}
