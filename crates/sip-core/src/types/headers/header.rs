use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use super::header_name::HeaderName;

/// A single header line as it appears in a message
///
/// The value is kept as text with folding already undone, so a message can
/// carry repeated and unknown headers in their original order. Typed views
/// are produced on demand through [`super::TypedHeaderTrait`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header name
    pub name: HeaderName,
    /// Header value, trimmed
    pub value: String,
}

impl Header {
    /// Creates a header from a name and value
    pub fn new(name: HeaderName, value: impl Into<String>) -> Self {
        Header {
            name,
            value: value.into().trim().to_string(),
        }
    }

    /// Alias of [`Header::new`] for text values
    pub fn text(name: HeaderName, value: impl AsRef<str>) -> Self {
        Header::new(name, value.as_ref())
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

impl FromStr for Header {
    type Err = Error;

    /// Parses a `Name: value` line
    fn from_str(s: &str) -> Result<Self> {
        let (name, value) = s
            .split_once(':')
            .ok_or_else(|| Error::ParseError(format!("Header line without colon: {}", s)))?;
        Ok(Header::new(HeaderName::from_str(name)?, value))
    }
}
