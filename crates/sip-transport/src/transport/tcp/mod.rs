//! TCP transport: one listener task plus one reader task per connection.
//!
//! Messages are framed with Content-Length and capped at
//! [`MAX_MESSAGE_SIZE`](sipconf_sip_core::MAX_MESSAGE_SIZE). A connection
//! whose framing is lost is dropped. Outgoing messages reuse an existing
//! connection to the destination, accepted or initiated, and open a new one
//! otherwise.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

use sipconf_sip_core::{message_length, parse_message, Message};
use crate::error::{Error, Result};
use crate::transport::{Transport, TransportEvent};

const DEFAULT_CHANNEL_CAPACITY: usize = 100;
const READ_CHUNK: usize = 8 * 1024;

/// TCP transport for SIP messages
#[derive(Clone)]
pub struct TcpTransport {
    inner: Arc<TcpTransportInner>,
}

struct TcpTransportInner {
    local_addr: SocketAddr,
    connections: Mutex<HashMap<SocketAddr, OwnedWriteHalf>>,
    closed: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
    events_tx: mpsc::Sender<TransportEvent>,
}

impl TcpTransport {
    /// Binds a listening socket and starts accepting connections
    pub async fn bind(
        addr: SocketAddr,
        channel_capacity: Option<usize>,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>)> {
        let capacity = channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY);
        let (events_tx, events_rx) = mpsc::channel(capacity);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::BindFailed { addr, source })?;
        let local_addr = listener.local_addr().map_err(Error::LocalAddr)?;
        info!("SIP TCP transport bound to {}", local_addr);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let transport = TcpTransport {
            inner: Arc::new(TcpTransportInner {
                local_addr,
                connections: Mutex::new(HashMap::new()),
                closed: AtomicBool::new(false),
                shutdown_tx,
                events_tx,
            }),
        };

        transport.spawn_accept_loop(listener, shutdown_rx);
        Ok((transport, events_rx))
    }

    fn spawn_accept_loop(&self, listener: TcpListener, mut shutdown_rx: watch::Receiver<bool>) {
        let transport = self.clone();
        tokio::spawn(async move {
            loop {
                let accepted = tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    accepted = listener.accept() => accepted,
                };
                match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "Accepted TCP connection");
                        transport.register(stream, peer).await;
                    }
                    Err(e) => {
                        warn!("Error accepting TCP connection: {}", e);
                    }
                }
            }
            let _ = transport.inner.events_tx.send(TransportEvent::Closed).await;
            info!("TCP accept loop terminated");
        });
    }

    /// Stores the write half and spawns a reader for the read half
    async fn register(&self, stream: TcpStream, peer: SocketAddr) {
        let (read_half, write_half) = stream.into_split();
        self.inner.connections.lock().await.insert(peer, write_half);
        self.spawn_reader(read_half, peer);
    }

    fn spawn_reader(&self, mut reader: OwnedReadHalf, peer: SocketAddr) {
        let transport = self.clone();
        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let inner = &transport.inner;
            let mut buf = BytesMut::with_capacity(READ_CHUNK);
            loop {
                let read = tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    read = reader.read_buf(&mut buf) => read,
                };
                match read {
                    Ok(0) => {
                        debug!(%peer, "TCP connection closed by peer");
                        break;
                    }
                    Ok(_) => {
                        if !transport.drain_frames(&mut buf, peer).await {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(%peer, "Error reading from TCP connection: {}", e);
                        break;
                    }
                }
            }
            inner.connections.lock().await.remove(&peer);
        });
    }

    /// Emits every complete message in `buf`; false when the connection must be dropped
    async fn drain_frames(&self, buf: &mut BytesMut, peer: SocketAddr) -> bool {
        let inner = &self.inner;
        loop {
            let length = match message_length(buf) {
                Ok(Some(length)) => length,
                Ok(None) => return true,
                Err(e) => {
                    // Framing is lost once Content-Length is unreadable
                    warn!(%peer, "Unframeable data on TCP connection: {}", e);
                    let _ = inner
                        .events_tx
                        .send(TransportEvent::Error {
                            error: format!("Framing error from {}: {}", peer, e),
                        })
                        .await;
                    return false;
                }
            };
            let frame = buf.split_to(length);
            let event = match parse_message(&frame) {
                Ok(message) => {
                    debug!(%peer, "Received {}", message.short_description());
                    TransportEvent::MessageReceived {
                        message,
                        source: peer,
                        destination: inner.local_addr,
                    }
                }
                Err(e) => {
                    warn!(%peer, "Undecodable TCP frame: {}", e);
                    TransportEvent::MalformedMessage {
                        raw: String::from_utf8_lossy(&frame).into_owned(),
                        error: e.to_string(),
                        source: peer,
                    }
                }
            };
            if inner.events_tx.send(event).await.is_err() {
                return false;
            }
            // Bare CRLF keep-alives between messages
            while buf.first().is_some_and(|b| *b == b'\r' || *b == b'\n') {
                buf.advance(1);
            }
        }
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr)
    }

    async fn send_message(&self, message: Message, destination: SocketAddr) -> Result<()> {
        if self.is_closed() {
            return Err(Error::TransportClosed);
        }
        let bytes = message.to_bytes();
        debug!(%destination, "Sending {} over TCP ({} bytes)", message.short_description(), bytes.len());

        let mut connections = self.inner.connections.lock().await;
        if !connections.contains_key(&destination) {
            let stream = TcpStream::connect(destination)
                .await
                .map_err(|source| Error::ConnectFailed { addr: destination, source })?;
            let (read_half, write_half) = stream.into_split();
            connections.insert(destination, write_half);
            self.spawn_reader(read_half, destination);
        }
        let Some(writer) = connections.get_mut(&destination) else {
            return Err(Error::TransportClosed);
        };
        if let Err(source) = writer.write_all(&bytes).await {
            connections.remove(&destination);
            return Err(Error::SendFailed { addr: destination, source });
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if !self.inner.closed.swap(true, Ordering::Relaxed) {
            let _ = self.inner.shutdown_tx.send(true);
            self.inner.connections.lock().await.clear();
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }

    fn is_unreliable(&self) -> bool {
        false
    }
}

impl fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TcpTransport({})", self.inner.local_addr)
    }
}
