//! SIP transport layer for the sipconf stack
//!
//! UDP and TCP transports that deliver parsed messages to the consumer as
//! [`TransportEvent`]s over a bounded channel.

pub mod error;
pub mod transport;


pub use error::{Error, Result};
pub use transport::tcp::TcpTransport;
pub use transport::udp::UdpTransport;
pub use transport::{Transport, TransportEvent};

/// Bind a UDP transport to the specified address
pub async fn bind_udp(
    addr: std::net::SocketAddr,
) -> Result<(UdpTransport, tokio::sync::mpsc::Receiver<TransportEvent>)> {
    UdpTransport::bind(addr, None).await
}

/// Bind a TCP transport to the specified address
pub async fn bind_tcp(
    addr: std::net::SocketAddr,
) -> Result<(TcpTransport, tokio::sync::mpsc::Receiver<TransportEvent>)> {
    TcpTransport::bind(addr, None).await
}

/// Re-export of common types for easier use
pub mod prelude {
    pub use crate::{bind_tcp, bind_udp, Error, Result, TcpTransport, Transport, TransportEvent, UdpTransport};
}
