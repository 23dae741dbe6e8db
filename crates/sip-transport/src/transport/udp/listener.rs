use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tracing::trace;

use crate::error::{Error, Result};

/// Largest datagram we read; SIP over UDP stays well below this
const MAX_UDP_PACKET_SIZE: usize = 65_535;

/// Receiving half of the UDP transport
pub struct UdpListener {
    socket: Arc<UdpSocket>,
}

impl UdpListener {
    /// Binds a new socket
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| Error::BindFailed { addr, source })?;
        Ok(UdpListener {
            socket: Arc::new(socket),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Error::LocalAddr)
    }

    /// Shares the socket with a sender
    pub fn clone_socket(&self) -> Arc<UdpSocket> {
        self.socket.clone()
    }

    /// Receives one datagram and its source
    pub async fn receive(&self) -> Result<(Bytes, SocketAddr)> {
        let mut buf = vec![0u8; MAX_UDP_PACKET_SIZE];
        let (len, src) = self.socket.recv_from(&mut buf).await.map_err(Error::ReceiveFailed)?;
        buf.truncate(len);
        trace!("Received {} bytes from {}", len, src);
        Ok((Bytes::from(buf), src))
    }
}
