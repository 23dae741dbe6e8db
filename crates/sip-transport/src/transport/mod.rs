pub mod tcp;
pub mod udp;

use std::fmt;
use std::net::SocketAddr;

use async_trait::async_trait;
use sipconf_sip_core::Message;

use crate::error::Result;

/// Events emitted by a transport's receive task
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A complete, parsed SIP message
    MessageReceived {
        message: Message,
        source: SocketAddr,
        destination: SocketAddr,
    },
    /// A datagram or frame that is not a valid SIP message
    MalformedMessage {
        /// Received bytes, lossily decoded as UTF-8
        raw: String,
        /// Why parsing failed
        error: String,
        source: SocketAddr,
    },
    /// Socket or framing error
    Error { error: String },
    /// The receive task has stopped
    Closed,
}

/// A connectionless or connection-oriented SIP transport
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Local address the transport is bound to
    fn local_addr(&self) -> Result<SocketAddr>;

    /// Serializes and sends a message to `destination`
    async fn send_message(&self, message: Message, destination: SocketAddr) -> Result<()>;

    /// Stops the receive task; later sends fail with `TransportClosed`
    async fn close(&self) -> Result<()>;

    fn is_closed(&self) -> bool;

    /// Whether requests need retransmission timers (true for UDP)
    fn is_unreliable(&self) -> bool;
}
