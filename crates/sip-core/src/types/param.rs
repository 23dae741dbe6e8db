//! # SIP Parameters
//!
//! Generic `;key[=value]` parameters as they appear on header values and URIs
//! ([RFC 3261 Section 25.1](https://datatracker.ietf.org/doc/html/rfc3261#section-25.1)).
//! Values are kept in their wire form, quoted strings included, so that a
//! parsed parameter serializes back unchanged. Keys compare case-insensitively.
//!
//! ```rust
//! use sipconf_sip_core::types::param::Param;
//!
//! let branch = Param::new("branch", Some("z9hG4bK776asdhds"));
//! assert_eq!(branch.to_string(), "branch=z9hG4bK776asdhds");
//!
//! let lr = Param::flag("lr");
//! assert_eq!(lr.to_string(), "lr");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single generic parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    key: String,
    value: Option<String>,
}

impl Param {
    /// Creates a parameter with an optional value
    pub fn new(key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Param {
            key: key.into(),
            value: value.map(Into::into),
        }
    }

    /// Creates a valueless parameter such as `lr` or `rport`
    pub fn flag(key: impl Into<String>) -> Self {
        Param {
            key: key.into(),
            value: None,
        }
    }

    /// Parameter name as it appeared on the wire
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw value, including surrounding quotes for quoted strings
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Value with surrounding quotes removed
    pub fn unquoted_value(&self) -> Option<&str> {
        self.value.as_deref().map(|v| {
            v.strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(v)
        })
    }

    /// Case-insensitive key comparison
    pub fn is(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.key, value),
            None => write!(f, "{}", self.key),
        }
    }
}

/// Finds a parameter by case-insensitive key
pub fn find_param<'a>(params: &'a [Param], key: &str) -> Option<&'a Param> {
    params.iter().find(|p| p.is(key))
}

/// Replaces the value of `key`, appending the parameter when absent
pub fn set_param(params: &mut Vec<Param>, key: &str, value: Option<&str>) {
    match params.iter_mut().find(|p| p.is(key)) {
        Some(existing) => existing.value = value.map(str::to_string),
        None => params.push(Param::new(key, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquoted_value() {
        let p = Param::new("reason", Some("\"busy now\""));
        assert_eq!(p.value(), Some("\"busy now\""));
        assert_eq!(p.unquoted_value(), Some("busy now"));
    }

    #[test]
    fn test_find_and_set() {
        let mut params = vec![Param::new("Branch", Some("z9hG4bK1")), Param::flag("rport")];
        assert_eq!(find_param(&params, "branch").and_then(Param::value), Some("z9hG4bK1"));

        set_param(&mut params, "rport", Some("5060"));
        set_param(&mut params, "received", Some("10.0.0.1"));
        let rendered: Vec<String> = params.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["Branch=z9hG4bK1", "rport=5060", "received=10.0.0.1"]);
    }
}
