//! Typed header value parsers.
//!
//! Each parser consumes a header *value* (the part after the colon) and leaves
//! trailing input for the caller; [`crate::parser::common::parse_all`] is used
//! by the typed headers to reject garbage after the value.

pub mod cseq;
pub mod min_se;
pub mod session_expires;
pub mod via;

pub use cseq::parse_cseq;
pub use min_se::parse_min_se;
pub use session_expires::parse_session_expires;
pub use via::parse_via;
