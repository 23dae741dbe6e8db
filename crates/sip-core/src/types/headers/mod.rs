//! Header storage and typed header views.

pub mod access;
pub mod header;
pub mod header_name;
pub mod typed_header;

pub use access::HeaderAccess;
pub use header::Header;
pub use header_name::HeaderName;
pub use typed_header::TypedHeaderTrait;
