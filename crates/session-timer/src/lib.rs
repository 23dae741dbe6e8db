//! # sipconf-session-timer
//!
//! RFC 4028 session timers for the conformance tooling.
//!
//! - [`negotiator`]: the UAS decision: accept an offered interval (and pick
//!   the refresher) or reject it with 422 and the local Min-SE
//! - [`retry`]: the UAC answer to 422, a new INVITE whose Session-Expires
//!   meets the peer's Min-SE
//! - [`uac`] / [`uas`]: drivers that run both over a transaction manager
//! - [`refresh`]: the refresh and expiry schedule of an established timer
//!
//! ```rust
//! use sipconf_session_timer::{Negotiation, SessionTimerConfig, SessionTimerNegotiator, SessionTimerOffer};
//!
//! let negotiator = SessionTimerNegotiator::new(
//!     SessionTimerConfig::default().with_min_se(2000).with_session_expires(2000),
//! );
//! let offer = SessionTimerOffer {
//!     session_expires: Some(1000),
//!     min_se: Some(100),
//!     supported: true,
//!     ..Default::default()
//! };
//! assert_eq!(negotiator.negotiate(&offer), Negotiation::TooSmall { min_se: 2000 });
//! ```

pub mod config;
pub mod error;
pub mod negotiator;
pub mod offer;
pub mod refresh;
pub mod retry;
pub mod uac;
pub mod uas;

pub use config::{SessionTimerConfig, TimerUsage, ABS_MIN_SE, DEFAULT_SESSION_EXPIRES};
pub use error::{Result, SessionTimerError};
pub use negotiator::{Negotiation, SessionTimerAgreement, SessionTimerNegotiator};
pub use offer::SessionTimerOffer;
pub use refresh::{SessionRefreshTimer, SessionTimerEvent, SessionTimerSchedule};
pub use retry::RetryController;
pub use uac::{EstablishedSession, SessionTimerUac};
pub use uas::{SessionTimerUas, UasExchange};
