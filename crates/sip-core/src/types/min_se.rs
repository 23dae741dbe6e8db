//! # Min-SE Header
//!
//! The Min-SE header ([RFC 4028 Section 5](https://datatracker.ietf.org/doc/html/rfc4028#section-5))
//! states the smallest session interval an element will accept. It appears in
//! INVITE and UPDATE requests and in 422 responses.
//!
//! ```
//! use sipconf_sip_core::types::min_se::MinSE;
//! use std::str::FromStr;
//!
//! let min_se = MinSE::from_str("2000").unwrap();
//! assert_eq!(min_se.delta_seconds, 2000);
//! assert_eq!(MinSE::new(90).to_string(), "90");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::common::parse_all;
use crate::parser::headers::min_se::parse_min_se;
use crate::types::headers::{HeaderName, TypedHeaderTrait};
use crate::types::param::Param;

/// Min-SE header value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinSE {
    /// Minimum session interval in seconds
    pub delta_seconds: u32,
    /// Extension parameters
    pub params: Vec<Param>,
}

impl MinSE {
    pub fn new(delta_seconds: u32) -> Self {
        MinSE {
            delta_seconds,
            params: Vec::new(),
        }
    }
}

impl FromStr for MinSE {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (delta_seconds, params) = parse_all("Min-SE", s.as_bytes(), parse_min_se)?;
        Ok(MinSE {
            delta_seconds,
            params,
        })
    }
}

impl fmt::Display for MinSE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.delta_seconds)?;
        for param in &self.params {
            write!(f, ";{}", param)?;
        }
        Ok(())
    }
}

impl TypedHeaderTrait for MinSE {
    fn header_name() -> HeaderName {
        HeaderName::MinSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::headers::Header;

    #[test]
    fn test_min_se_header() {
        let header = Header::text(HeaderName::MinSE, " 2000 ");
        let min_se = MinSE::from_header(&header).unwrap();
        assert_eq!(min_se, MinSE::new(2000));
        assert_eq!(min_se.to_header().to_string(), "Min-SE: 2000");
    }

    #[test]
    fn test_min_se_invalid() {
        assert!(MinSE::from_str("abc").is_err());
        assert!(MinSE::from_str("100 200").is_err());
    }
}
