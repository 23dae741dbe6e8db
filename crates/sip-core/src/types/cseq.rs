use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::common::parse_all;
use crate::parser::headers::cseq::parse_cseq;
use crate::types::headers::{HeaderName, TypedHeaderTrait};
use crate::types::method::Method;

/// CSeq header: sequence number and method
///
/// ```
/// use sipconf_sip_core::prelude::*;
/// use std::str::FromStr;
///
/// let cseq = CSeq::from_str("2 INVITE").unwrap();
/// assert_eq!(cseq.seq, 2);
/// assert_eq!(cseq.method, Method::Invite);
/// assert_eq!(cseq.next(Method::Invite).to_string(), "3 INVITE");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CSeq {
    pub seq: u32,
    pub method: Method,
}

impl CSeq {
    pub fn new(seq: u32, method: Method) -> Self {
        CSeq { seq, method }
    }

    /// The CSeq for the next request in the same dialog
    pub fn next(&self, method: Method) -> Self {
        CSeq {
            seq: self.seq.wrapping_add(1),
            method,
        }
    }
}

impl fmt::Display for CSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.seq, self.method)
    }
}

impl FromStr for CSeq {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (seq, method) = parse_all("CSeq", s.as_bytes(), parse_cseq)?;
        Ok(CSeq { seq, method })
    }
}

impl TypedHeaderTrait for CSeq {
    fn header_name() -> HeaderName {
        HeaderName::CSeq
    }
}
