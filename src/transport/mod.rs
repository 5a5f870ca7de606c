//! HTTP transport to the hosted model endpoint.

mod http;

pub use http::{HttpTransport, TransportError};
