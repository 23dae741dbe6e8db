//! Option-tag list headers: Supported, Require and Unsupported
//! ([RFC 3261 Section 20.37](https://datatracker.ietf.org/doc/html/rfc3261#section-20.37)).
//!
//! ```
//! use sipconf_sip_core::prelude::*;
//! use std::str::FromStr;
//!
//! let supported = Supported::from_str("timer, 100rel").unwrap();
//! assert!(supported.contains("TIMER"));
//! assert_eq!(supported.to_string(), "timer, 100rel");
//! ```

use std::fmt;
use std::str::FromStr;

use nom::multi::separated_list0;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::common::{parse_all, token};
use crate::parser::separators::comma;
use crate::parser::whitespace::sws;
use crate::parser::ParseResult;
use crate::types::headers::{HeaderName, TypedHeaderTrait};

/// Option tag for RFC 4028 session timers
pub const TIMER_OPTION_TAG: &str = "timer";

fn option_tags(input: &[u8]) -> ParseResult<Vec<String>> {
    let (input, _) = sws(input)?;
    let (input, tags) = separated_list0(comma, token)(input)?;
    Ok((input, tags.into_iter().map(str::to_string).collect()))
}

macro_rules! option_tag_header {
    ($(#[$doc:meta])* $name:ident, $header:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name(pub Vec<String>);

        impl $name {
            pub fn new<I, S>(tags: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                $name(tags.into_iter().map(Into::into).collect())
            }

            /// Case-insensitive membership test
            pub fn contains(&self, tag: &str) -> bool {
                self.0.iter().any(|t| t.eq_ignore_ascii_case(tag))
            }

            /// Adds a tag unless already present
            pub fn add(&mut self, tag: &str) {
                if !self.contains(tag) {
                    self.0.push(tag.to_string());
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.join(", "))
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                parse_all(stringify!($name), s.as_bytes(), option_tags).map($name)
            }
        }

        impl TypedHeaderTrait for $name {
            fn header_name() -> HeaderName {
                $header
            }
        }
    };
}

option_tag_header!(
    /// Supported: extensions the sender understands
    Supported,
    HeaderName::Supported
);
option_tag_header!(
    /// Require: extensions the recipient must support
    Require,
    HeaderName::Require
);
option_tag_header!(
    /// Unsupported: extensions the server did not understand
    Unsupported,
    HeaderName::Unsupported
);
