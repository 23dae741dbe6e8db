use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::headers::{HeaderName, TypedHeaderTrait};

/// Call-ID header value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(pub String);

impl CallId {
    pub fn new(value: impl Into<String>) -> Self {
        CallId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CallId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        // word ["@" word]; whitespace is the only thing we refuse outright
        if s.is_empty() || s.contains(char::is_whitespace) {
            return Err(Error::invalid_header("Call-ID", format!("invalid value \"{}\"", s)));
        }
        Ok(CallId(s.to_string()))
    }
}

impl TypedHeaderTrait for CallId {
    fn header_name() -> HeaderName {
        HeaderName::CallId
    }
}
