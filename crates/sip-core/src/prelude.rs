//! # Prelude
//!
//! Common types and functions, typically imported with
//! `use sipconf_sip_core::prelude::*;`

pub use crate::builder::{SimpleRequestBuilder, SimpleResponseBuilder};
pub use crate::error::{Error, Result};
pub use crate::parser::{message_length, parse_message};
pub use crate::types::{
    Address, CSeq, CallId, Contact, From, Header, HeaderAccess, HeaderName, Message, Method, MinSE, Param,
    Refresher, Request, Require, Response, Scheme, SentProtocol, SessionExpires, StatusCode, Supported,
    To, TypedHeaderTrait, Unsupported, Uri, Version, Via, ViaHeader, TIMER_OPTION_TAG,
};
