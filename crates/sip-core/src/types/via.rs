//! # SIP Via Header
//!
//! The Via header ([RFC 3261 Section 20.42](https://datatracker.ietf.org/doc/html/rfc3261#section-20.42))
//! records the path a request took so responses can be routed back, and its
//! `branch` parameter identifies the transaction.
//!
//! A single header line may carry several comma-separated entries; [`Via`]
//! holds all of them and [`ViaHeader`] is one hop.
//!
//! ```text
//! Via: SIP/2.0/UDP pc33.atlanta.com:5060;branch=z9hG4bK776asdhds
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use sipconf_sip_core::prelude::*;
//! use std::str::FromStr;
//!
//! let mut via = Via::new("UDP", "127.0.0.1", Some(5060), "z9hG4bK776asdhds");
//! assert_eq!(via.branch(), Some("z9hG4bK776asdhds"));
//!
//! via.set_branch("z9hG4bKnew");
//! assert_eq!(via.to_string(), "SIP/2.0/UDP 127.0.0.1:5060;branch=z9hG4bKnew");
//!
//! let parsed = Via::from_str("SIP/2.0/TCP 10.0.0.1;branch=z9hG4bK1, SIP/2.0/UDP 10.0.0.2").unwrap();
//! assert_eq!(parsed.headers().len(), 2);
//! assert_eq!(parsed.branch(), Some("z9hG4bK1"));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::common::parse_all;
use crate::parser::headers::via::parse_via;
use crate::types::headers::{HeaderName, TypedHeaderTrait};
use crate::types::param::{find_param, set_param, Param};

/// Magic cookie that RFC 3261 branch identifiers start with
pub const BRANCH_MAGIC_COOKIE: &str = "z9hG4bK";

/// A Via header line with one or more entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Via(pub Vec<ViaHeader>);

impl Via {
    /// Creates a single-entry `SIP/2.0/<transport>` Via with a branch
    pub fn new(transport: &str, host: impl Into<String>, port: Option<u16>, branch: &str) -> Self {
        Via(vec![ViaHeader {
            sent_protocol: SentProtocol {
                name: "SIP".to_string(),
                version: "2.0".to_string(),
                transport: transport.to_ascii_uppercase(),
            },
            sent_by_host: host.into(),
            sent_by_port: port,
            params: vec![Param::new("branch", Some(branch))],
        }])
    }

    /// All entries of this header line
    pub fn headers(&self) -> &[ViaHeader] {
        &self.0
    }

    /// The first (topmost) entry
    pub fn top(&self) -> Option<&ViaHeader> {
        self.0.first()
    }

    /// Branch of the topmost entry
    pub fn branch(&self) -> Option<&str> {
        self.top().and_then(ViaHeader::branch)
    }

    /// Replaces the branch of the topmost entry
    pub fn set_branch(&mut self, branch: &str) {
        if let Some(top) = self.0.first_mut() {
            set_param(&mut top.params, "branch", Some(branch));
        }
    }
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", entries.join(", "))
    }
}

impl FromStr for Via {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_all("Via", s.as_bytes(), parse_via).map(Via)
    }
}

impl TypedHeaderTrait for Via {
    fn header_name() -> HeaderName {
        HeaderName::Via
    }
}

/// `protocol-name/protocol-version/transport`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentProtocol {
    /// Protocol name (usually "SIP")
    pub name: String,
    /// Protocol version (usually "2.0")
    pub version: String,
    /// Transport protocol (e.g., "UDP", "TCP")
    pub transport: String,
}

impl fmt::Display for SentProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.name, self.version, self.transport)
    }
}

/// One hop of a Via header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViaHeader {
    /// Protocol information
    pub sent_protocol: SentProtocol,
    /// Host name or IP address; IPv6 references keep their brackets
    pub sent_by_host: String,
    /// Optional port number
    pub sent_by_port: Option<u16>,
    /// Parameters (branch, received, rport, ...)
    pub params: Vec<Param>,
}

impl ViaHeader {
    /// Transport protocol, e.g. "UDP"
    pub fn transport(&self) -> &str {
        &self.sent_protocol.transport
    }

    /// `branch` parameter
    pub fn branch(&self) -> Option<&str> {
        find_param(&self.params, "branch").and_then(Param::value)
    }

    /// `received` parameter
    pub fn received(&self) -> Option<&str> {
        find_param(&self.params, "received").and_then(Param::value)
    }

    /// Whether the branch carries the RFC 3261 magic cookie
    pub fn is_rfc3261_branch(&self) -> bool {
        self.branch()
            .is_some_and(|b| b.starts_with(BRANCH_MAGIC_COOKIE))
    }
}

impl fmt::Display for ViaHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.sent_protocol, self.sent_by_host)?;
        if let Some(port) = self.sent_by_port {
            write!(f, ":{}", port)?;
        }
        for param in &self.params {
            write!(f, ";{}", param)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::headers::Header;

    #[test]
    fn test_via_typed_header_trait() {
        let via = Via::from_str("SIP/2.0/UDP 192.168.1.1:5060;branch=z9hG4bK776asdhds").unwrap();
        assert_eq!(Via::header_name(), HeaderName::Via);

        let header = via.to_header();
        assert_eq!(header.name, HeaderName::Via);
        assert_eq!(Via::from_header(&header).unwrap(), via);
    }

    #[test]
    fn test_via_from_wrong_header() {
        let header = Header::text(HeaderName::To, "SIP/2.0/UDP 192.168.1.1");
        assert!(matches!(
            Via::from_header(&header),
            Err(Error::InvalidHeader { ref name, .. }) if name == "Via"
        ));
    }

    #[test]
    fn test_branch_cookie() {
        let via = Via::new("udp", "10.0.0.1", None, "z9hG4bK-1");
        assert_eq!(via.headers()[0].transport(), "UDP");
        assert!(via.headers()[0].is_rfc3261_branch());

        let old = Via::from_str("SIP/2.0/UDP 10.0.0.1;branch=1234").unwrap();
        assert!(!old.headers()[0].is_rfc3261_branch());
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(Via::from_str("SIP/2.0/UDP 10.0.0.1 junk").is_err());
    }
}
