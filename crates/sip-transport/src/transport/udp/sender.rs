use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::trace;

use crate::error::{Error, Result};

/// Largest message we put in a single datagram
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Sending half of the UDP transport
#[derive(Clone)]
pub struct UdpSender {
    socket: Arc<UdpSocket>,
}

impl UdpSender {
    pub fn new(socket: Arc<UdpSocket>) -> Self {
        UdpSender { socket }
    }

    /// Sends one datagram
    pub async fn send(&self, data: &[u8], addr: SocketAddr) -> Result<()> {
        if data.len() > MAX_DATAGRAM_SIZE {
            return Err(Error::MessageTooLarge(data.len()));
        }
        let sent = self
            .socket
            .send_to(data, addr)
            .await
            .map_err(|source| Error::SendFailed { addr, source })?;
        trace!("Sent {} bytes to {}", sent, addr);
        Ok(())
    }
}
