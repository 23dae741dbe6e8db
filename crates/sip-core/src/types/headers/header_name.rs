use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::common::is_token_char;

macro_rules! header_names {
    ($($(#[$doc:meta])* $variant:ident => $canonical:literal $(| $compact:literal)?;)+) => {
        /// SIP header names
        ///
        /// Header names are case-insensitive in SIP. Known headers parse from
        /// their long or compact form into a dedicated variant; everything else
        /// is kept verbatim in [`HeaderName::Other`], which still compares
        /// case-insensitively.
        ///
        /// # Examples
        ///
        /// ```rust
        /// use sipconf_sip_core::prelude::*;
        /// use std::str::FromStr;
        ///
        /// assert_eq!(HeaderName::from_str("x").unwrap(), HeaderName::SessionExpires);
        /// assert_eq!(HeaderName::from_str("min-se").unwrap(), HeaderName::MinSE);
        /// assert_eq!(HeaderName::MinSE.as_str(), "Min-SE");
        /// assert_eq!(
        ///     HeaderName::from_str("X-Test").unwrap(),
        ///     HeaderName::from_str("x-test").unwrap()
        /// );
        /// ```
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub enum HeaderName {
            $($(#[$doc])* $variant,)+
            /// Any header without a dedicated variant, spelled as received
            Other(String),
        }

        impl HeaderName {
            /// Canonical long form
            pub fn as_str(&self) -> &str {
                match self {
                    $(HeaderName::$variant => $canonical,)+
                    HeaderName::Other(name) => name,
                }
            }

            /// Compact form, where RFC 3261 or an extension defines one
            pub fn compact(&self) -> Option<char> {
                match self {
                    $($(HeaderName::$variant => Some($compact),)?)+
                    _ => None,
                }
            }

            fn known(name: &str) -> Option<Self> {
                $(
                    if name.eq_ignore_ascii_case($canonical)
                        $(|| (name.len() == 1 && name.starts_with(|c: char| c.eq_ignore_ascii_case(&$compact))))?
                    {
                        return Some(HeaderName::$variant);
                    }
                )+
                None
            }
        }
    };
}

header_names! {
    CallId => "Call-ID" | 'i';
    Contact => "Contact" | 'm';
    ContentLength => "Content-Length" | 'l';
    ContentType => "Content-Type" | 'c';
    CSeq => "CSeq";
    From => "From" | 'f';
    MaxForwards => "Max-Forwards";
    To => "To" | 't';
    Via => "Via" | 'v';
    /// Methods a UA accepts; required in 405 responses
    Allow => "Allow";
    RecordRoute => "Record-Route";
    Route => "Route";
    /// Option tags the sender understands
    Supported => "Supported" | 'k';
    /// Option tags the receiver must understand
    Require => "Require";
    /// Option tags the responder does not understand (420)
    Unsupported => "Unsupported";
    /// RFC 4028 session interval and refresher
    SessionExpires => "Session-Expires" | 'x';
    /// RFC 4028 smallest acceptable session interval
    MinSE => "Min-SE";
}

impl PartialEq for HeaderName {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HeaderName::Other(a), HeaderName::Other(b)) => a.eq_ignore_ascii_case(b),
            (HeaderName::Other(_), _) | (_, HeaderName::Other(_)) => false,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Eq for HeaderName {}

impl Hash for HeaderName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            HeaderName::Other(s) => {
                state.write_u8(0xff);
                s.to_ascii_lowercase().hash(state);
            }
            known => std::mem::discriminant(known).hash(state),
        }
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::ParseError("Empty header name is not allowed".to_string()));
        }
        if !s.bytes().all(is_token_char) {
            return Err(Error::ParseError(format!("Invalid header name: {}", s)));
        }
        Ok(HeaderName::known(s).unwrap_or_else(|| HeaderName::Other(s.to_string())))
    }
}
