//! Fluent builders for requests and responses.

mod request;
mod response;

pub use request::SimpleRequestBuilder;
pub use response::SimpleResponseBuilder;
