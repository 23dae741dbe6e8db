//! # SIP Status Codes
//!
//! Status codes as defined in
//! [RFC 3261 Section 21](https://datatracker.ietf.org/doc/html/rfc3261#section-21)
//! plus `422 Session Interval Too Small` from
//! [RFC 4028](https://datatracker.ietf.org/doc/html/rfc4028#section-6).
//!
//! - `1xx`: Provisional
//! - `2xx`: Success
//! - `3xx`: Redirection
//! - `4xx`: Client Error
//! - `5xx`: Server Error
//! - `6xx`: Global Failure
//!
//! ## Examples
//!
//! ```rust
//! use sipconf_sip_core::prelude::*;
//! use std::str::FromStr;
//!
//! let status = StatusCode::from_u16(422).unwrap();
//! assert_eq!(status, StatusCode::SessionIntervalTooSmall);
//! assert_eq!(status.reason_phrase(), "Session Interval Too Small");
//! assert!(status.is_client_error());
//!
//! let status = StatusCode::from_str("200").unwrap();
//! assert!(status.is_success());
//! assert_eq!(status.to_string(), "200 OK");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

macro_rules! status_codes {
    ($($(#[$doc:meta])* $variant:ident = $code:literal, $phrase:literal;)+) => {
        /// SIP status codes the stack knows by name
        ///
        /// Codes without a dedicated variant but inside `100..=699` are kept as
        /// [`StatusCode::Custom`], so any syntactically valid response round-trips.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum StatusCode {
            $($(#[$doc])* $variant,)+
            /// Any other code in 100..=699
            Custom(u16),
        }

        impl StatusCode {
            /// Maps a raw code to its variant; unknown codes in `100..=699` become `Custom`
            pub fn from_u16(code: u16) -> Result<Self> {
                match code {
                    $($code => Ok(StatusCode::$variant),)+
                    100..=699 => Ok(StatusCode::Custom(code)),
                    _ => Err(Error::InvalidStatusCode(code)),
                }
            }

            pub fn as_u16(&self) -> u16 {
                match self {
                    $(StatusCode::$variant => $code,)+
                    StatusCode::Custom(code) => *code,
                }
            }

            /// Canonical reason phrase; "Unknown" for custom codes
            pub fn reason_phrase(&self) -> &'static str {
                match self {
                    $(StatusCode::$variant => $phrase,)+
                    StatusCode::Custom(_) => "Unknown",
                }
            }
        }
    };
}

status_codes! {
    Trying = 100, "Trying";
    Ringing = 180, "Ringing";
    CallIsBeingForwarded = 181, "Call Is Being Forwarded";
    Queued = 182, "Queued";
    SessionProgress = 183, "Session Progress";

    Ok = 200, "OK";
    Accepted = 202, "Accepted";

    MultipleChoices = 300, "Multiple Choices";
    MovedPermanently = 301, "Moved Permanently";
    MovedTemporarily = 302, "Moved Temporarily";

    BadRequest = 400, "Bad Request";
    Unauthorized = 401, "Unauthorized";
    Forbidden = 403, "Forbidden";
    NotFound = 404, "Not Found";
    MethodNotAllowed = 405, "Method Not Allowed";
    RequestTimeout = 408, "Request Timeout";
    /// Sent when a required extension is not supported
    BadExtension = 420, "Bad Extension";
    /// Sent when the UAS needs an extension the request did not list
    ExtensionRequired = 421, "Extension Required";
    /// RFC 4028: Session-Expires below the UAS Min-SE
    SessionIntervalTooSmall = 422, "Session Interval Too Small";
    IntervalTooBrief = 423, "Interval Too Brief";
    TemporarilyUnavailable = 480, "Temporarily Unavailable";
    CallOrTransactionDoesNotExist = 481, "Call/Transaction Does Not Exist";
    BusyHere = 486, "Busy Here";
    RequestTerminated = 487, "Request Terminated";
    NotAcceptableHere = 488, "Not Acceptable Here";
    RequestPending = 491, "Request Pending";

    ServerInternalError = 500, "Server Internal Error";
    NotImplemented = 501, "Not Implemented";
    ServiceUnavailable = 503, "Service Unavailable";
    ServerTimeout = 504, "Server Time-out";

    BusyEverywhere = 600, "Busy Everywhere";
    Decline = 603, "Decline";
}

impl StatusCode {
    /// Leading digit of the code: 1 (provisional) through 6 (global failure)
    pub fn class(&self) -> u16 {
        self.as_u16() / 100
    }

    pub fn is_provisional(&self) -> bool {
        self.class() == 1
    }

    pub fn is_success(&self) -> bool {
        self.class() == 2
    }

    pub fn is_redirection(&self) -> bool {
        self.class() == 3
    }

    pub fn is_client_error(&self) -> bool {
        self.class() == 4
    }

    pub fn is_server_error(&self) -> bool {
        self.class() == 5
    }

    pub fn is_global_failure(&self) -> bool {
        self.class() == 6
    }

    /// Any response that ends a transaction (2xx-6xx)
    pub fn is_final(&self) -> bool {
        !self.is_provisional()
    }

    /// 4xx, 5xx or 6xx
    pub fn is_error(&self) -> bool {
        self.class() >= 4
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

impl FromStr for StatusCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().parse::<u16>().map_err(|_| Error::InvalidStatusCode(0))?;
        StatusCode::from_u16(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_round_trip() {
        for code in [100u16, 180, 183, 200, 302, 404, 422, 481, 487, 500, 603] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(!matches!(status, StatusCode::Custom(_)), "{} should be known", code);
            assert_eq!(status.as_u16(), code);
        }
    }

    #[test]
    fn test_custom_and_invalid_codes() {
        assert_eq!(StatusCode::from_u16(499).unwrap(), StatusCode::Custom(499));
        assert_eq!(StatusCode::Custom(499).to_string(), "499 Unknown");
        assert!(StatusCode::from_u16(99).is_err());
        assert!(StatusCode::from_u16(700).is_err());
        assert!(StatusCode::from_str("abc").is_err());
    }

    #[test]
    fn test_classification() {
        assert!(StatusCode::Trying.is_provisional());
        assert!(!StatusCode::Trying.is_final());
        assert!(StatusCode::Ok.is_success());
        assert!(StatusCode::MovedTemporarily.is_redirection());
        assert!(StatusCode::SessionIntervalTooSmall.is_client_error());
        assert!(StatusCode::SessionIntervalTooSmall.is_error());
        assert!(StatusCode::ServiceUnavailable.is_server_error());
        assert!(StatusCode::Decline.is_global_failure());
        assert_eq!(StatusCode::Custom(499).class(), 4);
    }
}
