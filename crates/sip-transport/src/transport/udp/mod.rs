//! UDP transport: a shared socket with one receive task.
//!
//! Each datagram carries exactly one message. Datagrams that fail to parse
//! are reported as [`TransportEvent::MalformedMessage`] and the loop keeps going.

mod listener;
mod sender;

pub use listener::UdpListener;
pub use sender::UdpSender;

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use sipconf_sip_core::{parse_message, Message};
use crate::error::{Error, Result};
use crate::transport::{Transport, TransportEvent};

const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// UDP transport for SIP messages
#[derive(Clone)]
pub struct UdpTransport {
    inner: Arc<UdpTransportInner>,
}

struct UdpTransportInner {
    local_addr: SocketAddr,
    sender: UdpSender,
    listener: UdpListener,
    closed: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
    events_tx: mpsc::Sender<TransportEvent>,
}

impl UdpTransport {
    /// Binds `addr` and starts the receive task
    pub async fn bind(
        addr: SocketAddr,
        channel_capacity: Option<usize>,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>)> {
        let (events_tx, events_rx) = mpsc::channel(channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY));

        let listener = UdpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("SIP UDP transport bound to {}", local_addr);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let transport = UdpTransport {
            inner: Arc::new(UdpTransportInner {
                local_addr,
                sender: UdpSender::new(listener.clone_socket()),
                listener,
                closed: AtomicBool::new(false),
                shutdown_tx,
                events_tx,
            }),
        };

        transport.spawn_receive_loop(shutdown_rx);
        Ok((transport, events_rx))
    }

    fn spawn_receive_loop(&self, mut shutdown_rx: watch::Receiver<bool>) {
        let transport = self.clone();
        tokio::spawn(async move {
            let inner = &transport.inner;
            loop {
                let received = tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    received = inner.listener.receive() => received,
                };
                let event = match received {
                    Ok((datagram, source)) => match transport.decode(datagram, source) {
                        Some(event) => event,
                        None => continue,
                    },
                    Err(_) if transport.is_closed() => break,
                    Err(e) => {
                        warn!("UDP receive failed: {}", e);
                        TransportEvent::Error {
                            error: e.to_string(),
                        }
                    }
                };
                if inner.events_tx.send(event).await.is_err() {
                    debug!("Event receiver dropped, stopping UDP receive loop");
                    break;
                }
            }
            let _ = inner.events_tx.send(TransportEvent::Closed).await;
            info!("UDP receive loop terminated");
        });
    }

    /// Turns one datagram into an event; `None` for CRLF keep-alives
    fn decode(&self, datagram: Bytes, source: SocketAddr) -> Option<TransportEvent> {
        if datagram.iter().all(|b| matches!(b, b'\r' | b'\n')) {
            return None;
        }
        Some(match parse_message(&datagram) {
            Ok(message) => {
                debug!(%source, "Received {}", message.short_description());
                TransportEvent::MessageReceived {
                    message,
                    source,
                    destination: self.inner.local_addr,
                }
            }
            Err(e) => {
                warn!(%source, "Undecodable datagram: {}", e);
                TransportEvent::MalformedMessage {
                    raw: String::from_utf8_lossy(&datagram).into_owned(),
                    error: e.to_string(),
                    source,
                }
            }
        })
    }
}

#[async_trait::async_trait]
impl Transport for UdpTransport {
    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr)
    }

    async fn send_message(&self, message: Message, destination: SocketAddr) -> Result<()> {
        if self.is_closed() {
            return Err(Error::TransportClosed);
        }
        let bytes = message.to_bytes();
        debug!(%destination, "Sending {} over UDP ({} bytes)", message.short_description(), bytes.len());
        self.inner.sender.send(&bytes, destination).await
    }

    async fn close(&self) -> Result<()> {
        if !self.inner.closed.swap(true, Ordering::Relaxed) {
            let _ = self.inner.shutdown_tx.send(true);
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }

    fn is_unreliable(&self) -> bool {
        true
    }
}

impl fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UdpTransport({})", self.inner.local_addr)
    }
}
