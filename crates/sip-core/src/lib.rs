//! # sipconf-sip-core
//!
//! SIP message codec used by the session-timer conformance tooling.
//!
//! The crate provides:
//!
//! - A message model ([`types::Request`], [`types::Response`], [`types::Message`])
//!   with headers kept in wire order
//! - Typed views of the headers the tooling inspects, including the RFC 4028
//!   `Session-Expires` and `Min-SE` headers
//! - nom parsers for start lines, header values and whole messages, plus
//!   stream framing for connection-oriented transports
//! - Fluent request/response builders
//!
//! ## Example
//!
//! ```rust
//! use sipconf_sip_core::prelude::*;
//!
//! let invite = SimpleRequestBuilder::invite("sip:127.0.0.1:5060").unwrap()
//!     .via("127.0.0.1:5070", "UDP", "z9hG4bK74bf9")
//!     .from("sip:alice@127.0.0.1", Some("9fxced76sl")).unwrap()
//!     .to("sip:127.0.0.1:5060", None).unwrap()
//!     .call_id("3848276298220188511@127.0.0.1")
//!     .cseq(1)
//!     .supported(&["timer"])
//!     .session_expires(1000, None)
//!     .min_se(100)
//!     .build();
//!
//! let parsed = parse_message(&invite.to_bytes()).unwrap();
//! let se = parsed.typed_header::<SessionExpires>().unwrap().unwrap();
//! assert_eq!(se.delta_seconds, 1000);
//! ```

pub mod builder;
pub mod error;
pub mod parser;
pub mod prelude;
pub mod types;

pub use error::{Error, Result};
pub use parser::{message_length, parse_message, MAX_MESSAGE_SIZE};
pub use types::{
    Header, HeaderAccess, HeaderName, Message, Method, Request, Response, StatusCode, TypedHeaderTrait, Uri,
};
