//! SIP message model: start-line parts, typed headers and messages.

pub mod address;
pub mod call_id;
pub mod cseq;
pub mod headers;
pub mod method;
pub mod min_se;
pub mod option_tag;
pub mod param;
pub mod session_expires;
pub mod sip_message;
pub mod sip_request;
pub mod sip_response;
pub mod status;
pub mod uri;
pub mod version;
pub mod via;

pub use address::{Address, Contact, From, To};
pub use call_id::CallId;
pub use cseq::CSeq;
pub use headers::{Header, HeaderAccess, HeaderName, TypedHeaderTrait};
pub use method::Method;
pub use min_se::MinSE;
pub use option_tag::{Require, Supported, Unsupported, TIMER_OPTION_TAG};
pub use param::Param;
pub use session_expires::{Refresher, SessionExpires};
pub use sip_message::Message;
pub use sip_request::Request;
pub use sip_response::Response;
pub use status::StatusCode;
pub use uri::{Scheme, Uri};
pub use version::Version;
pub use via::{SentProtocol, Via, ViaHeader};
