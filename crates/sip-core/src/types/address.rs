//! # Name-addr headers
//!
//! From, To and Contact share the `name-addr / addr-spec` grammar of
//! [RFC 3261 Section 20.10](https://datatracker.ietf.org/doc/html/rfc3261#section-20.10).
//! [`Address`] models that grammar; the header types wrap it and deref to it.
//!
//! ```text
//! To: "Bob" <sip:bob@biloxi.com>;tag=a6c85cf
//! f: sip:alice@127.0.0.1;tag=1928301774
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use sipconf_sip_core::prelude::*;
//! use std::str::FromStr;
//!
//! let to = To::from_str("\"Bob\" <sip:bob@biloxi.com>").unwrap();
//! assert_eq!(to.display_name.as_deref(), Some("Bob"));
//! assert_eq!(to.tag(), None);
//!
//! let to = to.with_tag("a6c85cf");
//! assert_eq!(to.to_string(), "\"Bob\" <sip:bob@biloxi.com>;tag=a6c85cf");
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::common::{nom_error, semi_params};
use crate::types::headers::{HeaderName, TypedHeaderTrait};
use crate::types::param::{find_param, set_param, Param};
use crate::types::uri::Uri;

/// A display name, URI and header parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Display name without quotes
    pub display_name: Option<String>,
    /// Address URI
    pub uri: Uri,
    /// Header parameters following the address (tag, expires, ...)
    pub params: Vec<Param>,
}

impl Address {
    pub fn new(uri: Uri) -> Self {
        Address {
            display_name: None,
            uri,
            params: Vec::new(),
        }
    }

    pub fn new_with_display_name(display_name: impl Into<String>, uri: Uri) -> Self {
        Address {
            display_name: Some(display_name.into()),
            uri,
            params: Vec::new(),
        }
    }

    /// `tag` parameter
    pub fn tag(&self) -> Option<&str> {
        find_param(&self.params, "tag").and_then(Param::value)
    }

    pub fn set_tag(&mut self, tag: &str) {
        set_param(&mut self.params, "tag", Some(tag));
    }
}

fn parse_params(input: &str, original: &str) -> Result<Vec<Param>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let (rem, params) = semi_params(input.as_bytes()).map_err(|e| nom_error("address parameters", e))?;
    if !rem.is_empty() {
        return Err(Error::ParseError(format!("Invalid address: {}", original)));
    }
    Ok(params)
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(open) = s.find('<') {
            let close = s[open..]
                .find('>')
                .map(|i| open + i)
                .ok_or_else(|| Error::ParseError(format!("Unterminated <uri> in address: {}", s)))?;
            let name = s[..open].trim();
            let display_name = if name.is_empty() {
                None
            } else {
                Some(
                    name.strip_prefix('"')
                        .and_then(|n| n.strip_suffix('"'))
                        .unwrap_or(name)
                        .to_string(),
                )
            };
            Ok(Address {
                display_name,
                uri: Uri::from_str(&s[open + 1..close])?,
                params: parse_params(&s[close + 1..], s)?,
            })
        } else {
            // addr-spec form: parameters after the URI belong to the header
            let (uri, params) = match s.find(';') {
                Some(idx) => (&s[..idx], &s[idx..]),
                None => (s, ""),
            };
            Ok(Address {
                display_name: None,
                uri: Uri::from_str(uri)?,
                params: parse_params(params, s)?,
            })
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.display_name {
            write!(f, "\"{}\" ", name)?;
        }
        write!(f, "<{}>", self.uri)?;
        for param in &self.params {
            write!(f, ";{}", param)?;
        }
        Ok(())
    }
}

macro_rules! address_header {
    ($(#[$doc:meta])* $name:ident, $header:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name(pub Address);

        impl $name {
            pub fn new(address: Address) -> Self {
                $name(address)
            }

            pub fn address(&self) -> &Address {
                &self.0
            }

            /// Returns the header with the tag parameter set
            pub fn with_tag(mut self, tag: &str) -> Self {
                self.0.set_tag(tag);
                self
            }
        }

        impl Deref for $name {
            type Target = Address;

            fn deref(&self) -> &Address {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Address {
                &mut self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Address::from_str(s).map($name)
            }
        }

        impl TypedHeaderTrait for $name {
            fn header_name() -> HeaderName {
                $header
            }
        }
    };
}

address_header!(
    /// From header: the initiator of the request
    From,
    HeaderName::From
);
address_header!(
    /// To header: the logical recipient of the request
    To,
    HeaderName::To
);
address_header!(
    /// Contact header: where subsequent requests should go
    Contact,
    HeaderName::Contact
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::headers::Header;

    #[test]
    fn test_addr_spec_params_belong_to_header() {
        let from = From::from_str("sip:alice@127.0.0.1;tag=1928301774").unwrap();
        assert_eq!(from.tag(), Some("1928301774"));
        assert!(from.uri.params.is_empty());
        assert_eq!(from.to_string(), "<sip:alice@127.0.0.1>;tag=1928301774");
    }

    #[test]
    fn test_name_addr_keeps_uri_params() {
        let contact = Contact::from_str("<sip:bob@10.0.0.1:5070;transport=udp>;expires=60").unwrap();
        assert_eq!(contact.uri.transport(), Some("udp"));
        assert_eq!(find_param(&contact.params, "expires").and_then(Param::value), Some("60"));
    }

    #[test]
    fn test_unquoted_display_name() {
        let to = To::from_str("Bob <sip:bob@biloxi.com>").unwrap();
        assert_eq!(to.display_name.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_set_tag_replaces() {
        let header = Header::text(HeaderName::To, "<sip:bob@biloxi.com>;tag=old");
        let mut to = To::from_header(&header).unwrap();
        to.set_tag("new");
        assert_eq!(to.tag(), Some("new"));
        assert_eq!(to.params.len(), 1);
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(To::from_str("<sip:bob@biloxi.com").is_err());
        assert!(To::from_str("").is_err());
        assert!(From::from_str("<sip:bob@biloxi.com> garbage").is_err());
    }
}
