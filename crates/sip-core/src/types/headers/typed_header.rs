use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use super::header::Header;
use super::header_name::HeaderName;

/// Conversion between a typed header value and a raw [`Header`]
///
/// Implementors provide `Display`/`FromStr` for the header *value* and name
/// the header they represent; the conversions come for free.
///
/// ```rust
/// use sipconf_sip_core::prelude::*;
/// use std::str::FromStr;
///
/// let header = Header::text(HeaderName::SessionExpires, "2000;refresher=uac");
/// let se = SessionExpires::from_header(&header).unwrap();
/// assert_eq!(se.delta_seconds, 2000);
/// assert_eq!(se.to_header(), header);
/// ```
pub trait TypedHeaderTrait: Sized + fmt::Display + FromStr<Err = Error> {
    /// The header this type is a view of
    fn header_name() -> HeaderName;

    /// Renders the typed value as a raw header
    fn to_header(&self) -> Header {
        Header::new(Self::header_name(), self.to_string())
    }

    /// Parses a raw header, checking that its name matches
    fn from_header(header: &Header) -> Result<Self> {
        let name = Self::header_name();
        if header.name != name {
            return Err(Error::invalid_header(
                name.as_str(),
                format!("expected {} header, got {}", name, header.name),
            ));
        }
        Self::from_str(&header.value).map_err(|e| match e {
            Error::InvalidHeader { .. } => e,
            other => Error::invalid_header(name.as_str(), other.to_string()),
        })
    }
}
