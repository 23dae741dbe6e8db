use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// SIP protocol version, `SIP/2.0` in practice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major version number
    pub major: u8,
    /// Minor version number
    pub minor: u8,
}

impl Version {
    /// Creates a version from its components
    pub const fn new(major: u8, minor: u8) -> Self {
        Version { major, minor }
    }

    /// `SIP/2.0`
    pub const fn sip_2_0() -> Self {
        Version::new(2, 0)
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::sip_2_0()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIP/{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .get(..4)
            .filter(|prefix| prefix.eq_ignore_ascii_case("SIP/"))
            .map(|_| &s[4..])
            .ok_or_else(|| Error::ParseError(format!("Invalid SIP version: {}", s)))?;
        let (major, minor) = rest
            .split_once('.')
            .ok_or_else(|| Error::ParseError(format!("Invalid SIP version: {}", s)))?;
        let major = major
            .parse::<u8>()
            .map_err(|_| Error::ParseError(format!("Invalid major version in {}", s)))?;
        let minor = minor
            .parse::<u8>()
            .map_err(|_| Error::ParseError(format!("Invalid minor version in {}", s)))?;
        Ok(Version { major, minor })
    }
}
