//! # SIP Methods
//!
//! Request methods from [RFC 3261 Section 7.1](https://datatracker.ietf.org/doc/html/rfc3261#section-7.1)
//! and the common extensions. Methods are case-sensitive tokens; anything that
//! is a valid token but not a known method is kept as [`Method::Extension`].
//!
//! ```
//! use sipconf_sip_core::types::method::Method;
//! use std::str::FromStr;
//!
//! assert_eq!(Method::from_str("INVITE").unwrap(), Method::Invite);
//! assert_eq!(Method::Update.to_string(), "UPDATE");
//! assert!(Method::from_str("invite").unwrap().is_extension());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::common::is_token_char;

/// SIP request method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// INVITE: initiates a session
    Invite,
    /// ACK: confirms a final response to INVITE
    Ack,
    /// BYE: terminates a session
    Bye,
    /// CANCEL: cancels a pending request
    Cancel,
    /// OPTIONS: queries capabilities
    Options,
    /// REGISTER: binds a contact to an address of record
    Register,
    /// UPDATE: session refresh without re-INVITE (RFC 3311)
    Update,
    /// PRACK: acknowledges a reliable provisional response (RFC 3262)
    Prack,
    /// INFO: mid-session information (RFC 6086)
    Info,
    /// SUBSCRIBE (RFC 6665)
    Subscribe,
    /// NOTIFY (RFC 6665)
    Notify,
    /// REFER (RFC 3515)
    Refer,
    /// MESSAGE (RFC 3428)
    Message,
    /// Any other valid token
    Extension(String),
}

impl Method {
    /// Returns the wire form of the method
    pub fn as_str(&self) -> &str {
        match self {
            Method::Invite => "INVITE",
            Method::Ack => "ACK",
            Method::Bye => "BYE",
            Method::Cancel => "CANCEL",
            Method::Options => "OPTIONS",
            Method::Register => "REGISTER",
            Method::Update => "UPDATE",
            Method::Prack => "PRACK",
            Method::Info => "INFO",
            Method::Subscribe => "SUBSCRIBE",
            Method::Notify => "NOTIFY",
            Method::Refer => "REFER",
            Method::Message => "MESSAGE",
            Method::Extension(name) => name,
        }
    }

    /// True for methods that are not part of the known set
    pub fn is_extension(&self) -> bool {
        matches!(self, Method::Extension(_))
    }

    /// Methods that establish a dialog and therefore use the INVITE
    /// transaction state machines
    pub fn is_invite(&self) -> bool {
        matches!(self, Method::Invite)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INVITE" => Ok(Method::Invite),
            "ACK" => Ok(Method::Ack),
            "BYE" => Ok(Method::Bye),
            "CANCEL" => Ok(Method::Cancel),
            "OPTIONS" => Ok(Method::Options),
            "REGISTER" => Ok(Method::Register),
            "UPDATE" => Ok(Method::Update),
            "PRACK" => Ok(Method::Prack),
            "INFO" => Ok(Method::Info),
            "SUBSCRIBE" => Ok(Method::Subscribe),
            "NOTIFY" => Ok(Method::Notify),
            "REFER" => Ok(Method::Refer),
            "MESSAGE" => Ok(Method::Message),
            _ if !s.is_empty() && s.bytes().all(is_token_char) => Ok(Method::Extension(s.to_string())),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}
