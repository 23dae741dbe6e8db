//! UAS side of RFC 4028: accept an offered session interval or answer 422.

use tracing::debug;

use sipconf_sip_core::builder::SimpleResponseBuilder;
use sipconf_sip_core::types::{Header, HeaderName, Refresher, Request, Response, StatusCode, TIMER_OPTION_TAG};

use crate::config::{SessionTimerConfig, TimerUsage};
use crate::offer::SessionTimerOffer;

/// A session interval both sides will run with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimerAgreement {
    /// Agreed Session-Expires, seconds
    pub session_expires: u32,
    pub refresher: Refresher,
}

/// Result of negotiating one offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation {
    /// Answer 2xx; `None` means no session timer for this session
    Accept(Option<SessionTimerAgreement>),
    /// Answer 422 Session Interval Too Small with this Min-SE
    TooSmall { min_se: u32 },
    /// Answer 421 Extension Required: the peer must support timers
    ExtensionRequired,
    /// Answer 420 Bad Extension: the peer requires timers we have disabled
    BadExtension,
}

impl Negotiation {
    pub fn status(&self) -> StatusCode {
        match self {
            Negotiation::Accept(_) => StatusCode::Ok,
            Negotiation::TooSmall { .. } => StatusCode::SessionIntervalTooSmall,
            Negotiation::ExtensionRequired => StatusCode::ExtensionRequired,
            Negotiation::BadExtension => StatusCode::BadExtension,
        }
    }

    pub fn agreement(&self) -> Option<SessionTimerAgreement> {
        match self {
            Negotiation::Accept(agreement) => *agreement,
            _ => None,
        }
    }
}

/// Applies a local [`SessionTimerConfig`] to incoming offers
#[derive(Debug, Clone)]
pub struct SessionTimerNegotiator {
    config: SessionTimerConfig,
}

impl SessionTimerNegotiator {
    pub fn new(config: SessionTimerConfig) -> Self {
        SessionTimerNegotiator { config }
    }

    pub fn config(&self) -> &SessionTimerConfig {
        &self.config
    }

    /// Decides how to answer `offer`
    ///
    /// An offered interval below the local Min-SE is rejected with that
    /// Min-SE. Otherwise the interval is accepted, reduced to the local
    /// maximum when one is set but never below either side's Min-SE. The
    /// refresher is the one the caller asked for, else the configured default
    /// when the caller supports timers, else the UAS.
    pub fn negotiate(&self, offer: &SessionTimerOffer) -> Negotiation {
        let config = &self.config;

        if config.usage == TimerUsage::Inactive {
            return if offer.required {
                Negotiation::BadExtension
            } else {
                Negotiation::Accept(None)
            };
        }
        if config.usage == TimerUsage::Required && !offer.supported && !offer.required {
            return Negotiation::ExtensionRequired;
        }

        let floor = offer.floor(config.min_se);
        let requested = match offer.session_expires {
            Some(requested) => requested,
            None if config.usage == TimerUsage::Always => config.session_expires.max(floor),
            None => return Negotiation::Accept(None),
        };

        if requested < config.min_se {
            debug!(requested, min_se = config.min_se, "Session interval too small");
            return Negotiation::TooSmall { min_se: config.min_se };
        }

        let mut session_expires = requested;
        if let Some(max) = config.max_session_expires {
            if session_expires > max {
                session_expires = max.max(floor);
            }
        }
        let session_expires = session_expires.max(floor);

        let refresher = match offer.refresher {
            Some(refresher) => refresher,
            None if offer.supported || offer.required => config.default_refresher,
            None => Refresher::Uas,
        };

        debug!(session_expires, %refresher, "Session interval accepted");
        Negotiation::Accept(Some(SessionTimerAgreement {
            session_expires,
            refresher,
        }))
    }

    /// Builds the response for `request` carrying the negotiated timer headers
    ///
    /// Via, From, To, Call-ID and CSeq are copied from the request and `to_tag`
    /// is added to To.
    pub fn respond(&self, request: &Request, negotiation: &Negotiation, to_tag: &str) -> Response {
        let mut builder = SimpleResponseBuilder::response_from_request(request, negotiation.status()).to_tag(to_tag);
        match negotiation {
            Negotiation::Accept(Some(agreement)) => {
                builder = builder.supported(&[TIMER_OPTION_TAG]);
                if agreement.refresher == Refresher::Uac {
                    builder = builder.require(&[TIMER_OPTION_TAG]);
                }
                builder = builder.session_expires(agreement.session_expires, Some(agreement.refresher));
            }
            Negotiation::Accept(None) => {
                if self.config.usage.is_enabled() {
                    builder = builder.supported(&[TIMER_OPTION_TAG]);
                }
            }
            Negotiation::TooSmall { min_se } => {
                builder = builder.min_se(*min_se);
            }
            Negotiation::ExtensionRequired => {
                builder = builder.require(&[TIMER_OPTION_TAG]);
            }
            Negotiation::BadExtension => {
                builder = builder.header(Header::text(HeaderName::Unsupported, TIMER_OPTION_TAG));
            }
        }
        builder.build()
    }
}
