use crate::error::{Error, Result};
use super::header::Header;
use super::header_name::HeaderName;
use super::typed_header::TypedHeaderTrait;
use crate::types::address::{From, To};
use crate::types::call_id::CallId;
use crate::types::cseq::CSeq;
use crate::types::via::Via;

/// Uniform header access for requests, responses and [`crate::types::Message`]
///
/// Only the two accessors are required; lookups, typed views and mutation
/// come as default methods. Name matching follows [`HeaderName`] equality,
/// so compact and long forms are interchangeable.
pub trait HeaderAccess {
    /// All headers in wire order
    fn headers(&self) -> &[Header];

    /// Mutable access to the header list
    fn headers_mut(&mut self) -> &mut Vec<Header>;

    /// First header with the given name
    fn header(&self, name: &HeaderName) -> Option<&Header> {
        self.headers().iter().find(|h| &h.name == name)
    }

    /// All headers with the given name, in order
    fn headers_named<'a>(&'a self, name: &'a HeaderName) -> Box<dyn Iterator<Item = &'a Header> + 'a> {
        Box::new(self.headers().iter().filter(move |h| &h.name == name))
    }

    /// Whether a header with the given name is present
    fn has_header(&self, name: &HeaderName) -> bool {
        self.header(name).is_some()
    }

    /// Parses the first header of type `T`
    ///
    /// `Ok(None)` when absent, `Err` when present but malformed.
    fn typed_header<T: TypedHeaderTrait>(&self) -> Result<Option<T>> {
        self.header(&T::header_name()).map(T::from_header).transpose()
    }

    /// Like [`HeaderAccess::typed_header`] but absence is an error
    fn require_header<T: TypedHeaderTrait>(&self) -> Result<T> {
        self.typed_header::<T>()?
            .ok_or_else(|| Error::MissingHeader(T::header_name().to_string()))
    }

    /// Appends a header
    fn add_header(&mut self, header: Header) {
        self.headers_mut().push(header);
    }

    /// Replaces every header with the same name by `header`, keeping the position of the first
    fn set_header(&mut self, header: Header) {
        let headers = self.headers_mut();
        match headers.iter().position(|h| h.name == header.name) {
            Some(idx) => {
                let name = header.name.clone();
                headers[idx] = header;
                let mut i = 0;
                headers.retain(|h| {
                    let keep = i <= idx || h.name != name;
                    i += 1;
                    keep
                });
            }
            None => headers.push(header),
        }
    }

    /// Sets a typed header, replacing existing ones
    fn set_typed_header<T: TypedHeaderTrait>(&mut self, value: &T) {
        self.set_header(value.to_header());
    }

    /// Removes all headers with the given name, returning how many were removed
    fn remove_header(&mut self, name: &HeaderName) -> usize {
        let headers = self.headers_mut();
        let before = headers.len();
        headers.retain(|h| &h.name != name);
        before - headers.len()
    }

    /// Call-ID
    fn call_id(&self) -> Result<CallId> {
        self.require_header::<CallId>()
    }

    /// CSeq
    fn cseq(&self) -> Result<CSeq> {
        self.require_header::<CSeq>()
    }

    /// From
    fn from(&self) -> Result<From> {
        self.require_header::<From>()
    }

    /// To
    fn to(&self) -> Result<To> {
        self.require_header::<To>()
    }

    /// Topmost Via entry list (first Via header line)
    fn first_via(&self) -> Result<Via> {
        self.require_header::<Via>()
    }

    /// All Via entries across every Via header line, top first
    fn vias(&self) -> Result<Vec<Via>> {
        self.headers_named(&HeaderName::Via).map(Via::from_header).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::session_expires::SessionExpires;
    use std::str::FromStr;

    #[derive(Default)]
    struct Bag(Vec<Header>);

    impl HeaderAccess for Bag {
        fn headers(&self) -> &[Header] {
            &self.0
        }

        fn headers_mut(&mut self) -> &mut Vec<Header> {
            &mut self.0
        }
    }

    #[test]
    fn test_typed_lookup_and_compact_names() {
        let mut bag = Bag::default();
        bag.add_header(Header::from_str("x: 1000").unwrap());
        bag.add_header(Header::from_str("i: abc@host").unwrap());

        let se = bag.typed_header::<SessionExpires>().unwrap().unwrap();
        assert_eq!(se.delta_seconds, 1000);
        assert_eq!(bag.call_id().unwrap().as_str(), "abc@host");
        assert!(matches!(bag.cseq(), Err(Error::MissingHeader(ref n)) if n == "CSeq"));
    }

    #[test]
    fn test_malformed_header_is_error_not_absent() {
        let mut bag = Bag::default();
        bag.add_header(Header::text(HeaderName::MinSE, "soon"));
        assert!(bag.typed_header::<crate::types::min_se::MinSE>().is_err());
    }

    #[test]
    fn test_set_header_replaces_all_in_place() {
        let mut bag = Bag::default();
        bag.add_header(Header::text(HeaderName::Via, "SIP/2.0/UDP a;branch=z9hG4bK1"));
        bag.add_header(Header::text(HeaderName::SessionExpires, "1000"));
        bag.add_header(Header::text(HeaderName::To, "<sip:b@c>"));
        bag.add_header(Header::text(HeaderName::SessionExpires, "1200"));

        bag.set_typed_header(&SessionExpires::new(2000, None));
        let names: Vec<String> = bag.headers().iter().map(|h| h.to_string()).collect();
        assert_eq!(
            names,
            vec!["Via: SIP/2.0/UDP a;branch=z9hG4bK1", "Session-Expires: 2000", "To: <sip:b@c>"]
        );

        assert_eq!(bag.remove_header(&HeaderName::SessionExpires), 1);
        assert!(!bag.has_header(&HeaderName::SessionExpires));
    }

    #[test]
    fn test_multiple_via_lines() {
        let mut bag = Bag::default();
        bag.add_header(Header::text(HeaderName::Via, "SIP/2.0/UDP a;branch=z9hG4bK1"));
        bag.add_header(Header::text(HeaderName::Via, "SIP/2.0/UDP b;branch=z9hG4bK2, SIP/2.0/UDP c"));
        let vias = bag.vias().unwrap();
        assert_eq!(vias.len(), 2);
        assert_eq!(vias[1].headers().len(), 2);
        assert_eq!(bag.first_via().unwrap().branch(), Some("z9hG4bK1"));
    }
}
