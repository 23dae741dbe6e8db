use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// A type alias for handling `Result`s with `Error`
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the transport layer
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to bind a socket
    #[error("Failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Failed to connect to a remote address
    #[error("Failed to connect to {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Failed to send a message
    #[error("Failed to send message to {addr}: {source}")]
    SendFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Failed to read from a socket
    #[error("Failed to receive: {0}")]
    ReceiveFailed(#[source] io::Error),

    /// Message does not fit in a datagram
    #[error("Message too large: {0} bytes")]
    MessageTooLarge(usize),

    /// The transport has been closed
    #[error("Transport is closed")]
    TransportClosed,

    /// Local address lookup failed
    #[error("Local address unavailable: {0}")]
    LocalAddr(#[source] io::Error),

    /// A received message could not be decoded
    #[error("SIP codec error: {0}")]
    Codec(#[from] sipconf_sip_core::Error),
}
