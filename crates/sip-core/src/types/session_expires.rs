//! RFC 4028 `Session-Expires`
//!
//! Carried in INVITE/UPDATE requests and their 2xx responses. The value is
//! the session interval in seconds; `refresher` says which side sends the
//! refreshing re-INVITE or UPDATE. A request may leave it out, a 2xx that
//! accepts a timer always names one.
//!
//! ```text
//! Session-Expires: 2000;refresher=uac
//! x: 1000
//! ```
//!
//! ```
//! use sipconf_sip_core::types::session_expires::{Refresher, SessionExpires};
//! use std::str::FromStr;
//!
//! let offered = SessionExpires::from_str("1000").unwrap();
//! assert_eq!(offered.refresher, None);
//!
//! let agreed = SessionExpires::new(2000, Some(Refresher::Uac));
//! assert_eq!(agreed.to_string(), "2000;refresher=uac");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::common::parse_all;
use crate::parser::headers::session_expires::parse_session_expires;
use crate::types::headers::{HeaderName, TypedHeaderTrait};
use crate::types::param::Param;

/// Side of the dialog that refreshes the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Refresher {
    Uac,
    Uas,
}

impl fmt::Display for Refresher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Refresher::Uac => "uac",
            Refresher::Uas => "uas",
        })
    }
}

impl FromStr for Refresher {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uac" => Ok(Refresher::Uac),
            "uas" => Ok(Refresher::Uas),
            other => Err(Error::invalid_header(
                "Session-Expires",
                format!("refresher must be uac or uas, got {}", other),
            )),
        }
    }
}

/// Parsed `Session-Expires` value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionExpires {
    /// Session interval in seconds
    pub delta_seconds: u32,
    pub refresher: Option<Refresher>,
    /// Parameters other than `refresher`, in order
    pub params: Vec<Param>,
}

impl SessionExpires {
    pub fn new(delta_seconds: u32, refresher: Option<Refresher>) -> Self {
        SessionExpires {
            delta_seconds,
            refresher,
            params: Vec::new(),
        }
    }

    /// Returns a copy with the given refresher
    pub fn with_refresher(mut self, refresher: Refresher) -> Self {
        self.refresher = Some(refresher);
        self
    }
}

impl FromStr for SessionExpires {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (delta_seconds, refresher, params) =
            parse_all("Session-Expires", s.as_bytes(), parse_session_expires)?;
        Ok(SessionExpires {
            delta_seconds,
            refresher,
            params,
        })
    }
}

impl TypedHeaderTrait for SessionExpires {
    fn header_name() -> HeaderName {
        HeaderName::SessionExpires
    }
}

impl fmt::Display for SessionExpires {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.delta_seconds)?;
        if let Some(refresher) = self.refresher {
            write!(f, ";refresher={}", refresher)?;
        }
        self.params.iter().try_for_each(|param| write!(f, ";{}", param))
    }
}
