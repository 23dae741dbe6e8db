//! Drives client and server transactions over one transport.
//!
//! The manager owns the transport's event receiver. Every public operation
//! pumps that receiver, so retransmissions are absorbed and late ACKs are
//! matched whichever operation happens to be waiting.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, trace, warn};

use sipconf_sip_core::types::{Message, Method, Request, Response};
use sipconf_sip_transport::{Transport, TransportEvent};

use crate::builders::create_ack_for_non2xx;
use crate::error::{Error, Result};
use crate::matcher::TransactionMatcher;
use crate::timer::TimerSettings;
use crate::transaction::{Transaction, TransactionKey, TransactionKind, TransactionState};

/// A new request that opened a server transaction
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub key: TransactionKey,
    pub request: Request,
    pub source: SocketAddr,
}

/// Outcome of feeding one transport event through the matcher
enum Inbound {
    /// A response for a live client transaction
    Response(TransactionKey, Response),
    /// Bytes from the remote that failed to parse
    Malformed(Error),
    /// Retransmission, ACK or stray message
    Absorbed,
}

/// Transaction layer for one user agent
#[derive(Debug)]
pub struct TransactionManager {
    transport: Arc<dyn Transport>,
    events: mpsc::Receiver<TransportEvent>,
    settings: TimerSettings,
    transactions: Arc<TransactionMatcher>,
    pending: VecDeque<IncomingRequest>,
}

impl TransactionManager {
    pub fn new(
        transport: Arc<dyn Transport>,
        events: mpsc::Receiver<TransportEvent>,
        settings: TimerSettings,
    ) -> Self {
        TransactionManager {
            transport,
            events,
            settings,
            transactions: Arc::new(TransactionMatcher::new()),
            pending: VecDeque::new(),
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.transport.local_addr()?)
    }

    /// Via transport token of the underlying transport
    pub fn transport_name(&self) -> &'static str {
        if self.transport.is_unreliable() { "UDP" } else { "TCP" }
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    /// Shared view of the transaction table
    pub fn transactions(&self) -> Arc<TransactionMatcher> {
        self.transactions.clone()
    }

    /// Snapshot of one transaction
    pub fn transaction(&self, key: &TransactionKey) -> Option<Transaction> {
        self.transactions.get(key)
    }

    pub async fn close(&self) -> Result<()> {
        Ok(self.transport.close().await?)
    }

    /// Sends a request in a new client transaction and waits for its final response
    ///
    /// Provisional responses are recorded on the transaction. The request is
    /// retransmitted on Timer A (INVITE) or Timer E (others) only over
    /// unreliable transports. A non-2xx final response to an INVITE is ACKed
    /// within the transaction. No final response by Timer B/F is a
    /// [`Error::Timeout`].
    pub async fn send_request(&mut self, request: Request, destination: SocketAddr) -> Result<Response> {
        self.transactions.purge_expired(Instant::now());

        let key = TransactionKey::from_request(&request, false)?;
        if request.method == Method::Ack {
            return Err(Error::InvalidRequest("ACK does not open a client transaction".to_string()));
        }
        let is_invite = request.method == Method::Invite;
        self.transactions
            .insert(Transaction::new(key.clone(), request.clone(), destination))?;

        info!(id = %key, %destination, "Sending {} request", request.method);
        self.transport
            .send_message(Message::Request(request.clone()), destination)
            .await?;

        let unreliable = self.transport.is_unreliable();
        let settings = self.settings;
        let timeout = if is_invite { settings.timer_b() } else { settings.timer_f() };
        let deadline = Instant::now() + timeout;
        let interval = |attempt: u32| {
            if is_invite {
                settings.timer_a(attempt)
            } else {
                settings.timer_e(attempt)
            }
        };
        let mut attempt = 0;
        let mut retransmit_at = unreliable.then(|| Instant::now() + interval(attempt));

        loop {
            let wake = retransmit_at.map_or(deadline, |at| at.min(deadline));
            let event = tokio::select! {
                event = self.events.recv() => Some(event.ok_or(Error::ChannelClosed)?),
                _ = sleep_until(wake) => None,
            };

            let Some(event) = event else {
                if Instant::now() >= deadline {
                    self.transactions.update(&key, |tx| tx.transition(TransactionState::Terminated))??;
                    self.transactions.remove(&key);
                    warn!(id = %key, "Timer {} fired, no final response", if is_invite { "B" } else { "F" });
                    return Err(Error::Timeout {
                        waiting_for: format!("final response to {}", request.method),
                        after: timeout,
                    });
                }
                let state = self.transactions.update(&key, |tx| tx.state())?;
                // INVITE retransmission stops once a provisional arrives
                if state == TransactionState::Proceeding && is_invite {
                    retransmit_at = None;
                    continue;
                }
                attempt += 1;
                debug!(id = %key, attempt, "Retransmitting {}", request.method);
                self.transport
                    .send_message(Message::Request(request.clone()), destination)
                    .await?;
                retransmit_at = Some(Instant::now() + interval(attempt));
                continue;
            };

            let (matched, response) = match self.process_event(event).await? {
                Inbound::Response(matched, response) => (matched, response),
                Inbound::Malformed(_) | Inbound::Absorbed => continue,
            };
            if matched != key {
                continue;
            }

            if response.status.is_provisional() {
                self.transactions
                    .update(&key, |tx| tx.transition(TransactionState::Proceeding))??;
                if is_invite {
                    retransmit_at = None;
                }
                continue;
            }

            self.complete_client(&key, &request, &response, destination, unreliable)
                .await?;
            return Ok(response);
        }
    }

    async fn complete_client(
        &mut self,
        key: &TransactionKey,
        request: &Request,
        response: &Response,
        destination: SocketAddr,
        unreliable: bool,
    ) -> Result<()> {
        let now = Instant::now();
        let linger = |d: Duration| Some(now + if unreliable { d } else { Duration::ZERO });

        if request.method != Method::Invite {
            let until = linger(self.settings.timer_k());
            return self.transactions.update(key, |tx| {
                tx.linger_until = until;
                tx.transition(TransactionState::Completed)
            })?;
        }

        if response.status.is_success() {
            // The ACK for a 2xx is the dialog's business; keep the record so
            // retransmitted 2xx can be answered once that ACK is sent.
            let until = Some(now + self.settings.timer_b());
            return self.transactions.update(key, |tx| {
                tx.linger_until = until;
                tx.transition(TransactionState::Terminated)
            })?;
        }

        let ack = create_ack_for_non2xx(request, response)?;
        debug!(id = %key, status = response.status_code(), "ACKing non-2xx final response");
        self.transport
            .send_message(Message::Request(ack.clone()), destination)
            .await?;
        let until = linger(self.settings.timer_d());
        self.transactions.update(key, |tx| {
            tx.ack = Some(ack);
            tx.linger_until = until;
            tx.transition(TransactionState::Completed)
        })?
    }

    /// Sends the ACK for a 2xx to the INVITE of client transaction `invite_key`
    ///
    /// The ACK is remembered so retransmitted 2xx responses are answered with it.
    pub async fn send_ack(&mut self, invite_key: &TransactionKey, ack: Request) -> Result<()> {
        let remote = self.transactions.update(invite_key, |tx| tx.remote)?;
        debug!(id = %invite_key, "Sending ACK for 2xx");
        self.transport
            .send_message(Message::Request(ack.clone()), remote)
            .await?;
        self.transactions.update(invite_key, |tx| tx.ack = Some(ack))
    }

    /// Waits for a request that opens a new server transaction
    ///
    /// A message that fails to parse ends the wait with
    /// [`Error::MalformedMessage`]; the caller decides whether to keep waiting.
    pub async fn next_request(&mut self, timeout: Duration) -> Result<IncomingRequest> {
        self.transactions.purge_expired(Instant::now());
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(incoming) = self.pending.pop_front() {
                return Ok(incoming);
            }
            let event = tokio::select! {
                event = self.events.recv() => event.ok_or(Error::ChannelClosed)?,
                _ = sleep_until(deadline) => {
                    return Err(Error::Timeout {
                        waiting_for: "request".to_string(),
                        after: timeout,
                    });
                }
            };
            match self.process_event(event).await? {
                Inbound::Response(key, response) => {
                    trace!(id = %key, status = response.status_code(), "Late response while waiting for a request");
                }
                Inbound::Malformed(error) => return Err(error),
                Inbound::Absorbed => {}
            }
        }
    }

    /// Sends a response within server transaction `key`
    pub async fn send_response(&mut self, key: &TransactionKey, response: Response) -> Result<()> {
        let (kind, remote) = self.transactions.update(key, |tx| (tx.kind, tx.remote))?;
        info!(id = %key, status = response.status_code(), "Sending response");
        self.transport
            .send_message(Message::Response(response.clone()), remote)
            .await?;

        let status = response.status;
        let unreliable = self.transport.is_unreliable();
        let now = Instant::now();
        let timer_j = self.settings.timer_j();
        self.transactions.update(key, |tx| {
            tx.record_response(response);
            let next = match (kind, status.is_provisional(), status.is_success()) {
                (_, true, _) => TransactionState::Proceeding,
                (TransactionKind::InviteServer, false, true) => TransactionState::Terminated,
                _ => TransactionState::Completed,
            };
            if kind == TransactionKind::NonInviteServer && next == TransactionState::Completed {
                tx.linger_until = Some(now + if unreliable { timer_j } else { Duration::ZERO });
            }
            tx.transition(next)
        })?
    }

    /// Waits for the ACK of the final response sent on INVITE server transaction `key`
    ///
    /// The final response is retransmitted on Timer G over unreliable
    /// transports. No ACK by Timer H is a [`Error::Timeout`].
    pub async fn wait_for_ack(&mut self, key: &TransactionKey) -> Result<Request> {
        let tx = self
            .transactions
            .get(key)
            .ok_or_else(|| Error::TransactionNotFound(key.clone()))?;
        if tx.kind != TransactionKind::InviteServer {
            return Err(Error::InvalidRequest(format!("{} is not an INVITE server transaction", key)));
        }
        let final_response = tx
            .final_response()
            .cloned()
            .ok_or_else(|| Error::InvalidRequest(format!("no final response sent on {}", key)))?;
        if let Some(ack) = tx.ack {
            return Ok(ack);
        }

        let timeout = self.settings.timer_h();
        let deadline = Instant::now() + timeout;
        let mut attempt = 0;
        let mut retransmit_at = self
            .transport
            .is_unreliable()
            .then(|| Instant::now() + self.settings.timer_g(attempt));

        loop {
            let wake = retransmit_at.map_or(deadline, |at| at.min(deadline));
            tokio::select! {
                event = self.events.recv() => {
                    let event = event.ok_or(Error::ChannelClosed)?;
                    self.process_event(event).await?;
                }
                _ = sleep_until(wake) => {
                    if Instant::now() >= deadline {
                        warn!(id = %key, "Timer H fired, no ACK");
                        self.transactions.update(key, |tx| tx.transition(TransactionState::Terminated))??;
                        self.transactions.remove(key);
                        return Err(Error::Timeout {
                            waiting_for: "ACK".to_string(),
                            after: timeout,
                        });
                    }
                    attempt += 1;
                    debug!(id = %key, attempt, "Retransmitting final response");
                    self.transport
                        .send_message(Message::Response(final_response.clone()), tx.remote)
                        .await?;
                    retransmit_at = Some(Instant::now() + self.settings.timer_g(attempt));
                }
            }
            if let Some(ack) = self.transactions.update(key, |tx| tx.ack.clone())? {
                return Ok(ack);
            }
        }
    }

    async fn process_event(&mut self, event: TransportEvent) -> Result<Inbound> {
        match event {
            TransportEvent::MessageReceived { message, source, .. } => match message {
                Message::Request(request) => self.process_request(request, source).await,
                Message::Response(response) => self.process_response(response).await,
            },
            TransportEvent::MalformedMessage { raw, error, source } => {
                warn!(%source, "Malformed message: {}", error);
                Ok(Inbound::Malformed(Error::MalformedMessage {
                    detail: error,
                    raw,
                    source_addr: source,
                }))
            }
            TransportEvent::Error { error } => {
                warn!("Transport reported: {}", error);
                Ok(Inbound::Absorbed)
            }
            TransportEvent::Closed => Err(Error::ChannelClosed),
        }
    }

    async fn process_request(&mut self, request: Request, source: SocketAddr) -> Result<Inbound> {
        if let Some(key) = self.transactions.match_request(&request) {
            if request.method == Method::Ack {
                let now = Instant::now();
                let linger = if self.transport.is_unreliable() { self.settings.timer_i() } else { Duration::ZERO };
                let t4 = self.settings.t4;
                self.transactions.update(&key, |tx| {
                    tx.ack = Some(request);
                    if tx.state() == TransactionState::Completed {
                        tx.linger_until = Some(now + linger);
                        tx.transition(TransactionState::Confirmed)
                    } else {
                        tx.linger_until = Some(now + t4);
                        Ok(())
                    }
                })??;
                debug!(id = %key, "ACK received");
                return Ok(Inbound::Absorbed);
            }

            let last = self.transactions.update(&key, |tx| tx.last_response().cloned())?;
            if let Some(response) = last {
                debug!(id = %key, "Request retransmission, resending last response");
                self.transport
                    .send_message(Message::Response(response), source)
                    .await?;
            }
            return Ok(Inbound::Absorbed);
        }

        if request.method == Method::Ack {
            debug!("Dropping ACK that matches no transaction");
            return Ok(Inbound::Absorbed);
        }

        let key = match TransactionKey::from_request(&request, true) {
            Ok(key) => key,
            Err(e) => {
                warn!("Dropping {} request without a transaction identity: {}", request.method, e);
                return Ok(Inbound::Absorbed);
            }
        };
        self.transactions
            .insert(Transaction::new(key.clone(), request.clone(), source))?;
        info!(id = %key, %source, "Received {} request", request.method);
        self.pending.push_back(IncomingRequest { key, request, source });
        Ok(Inbound::Absorbed)
    }

    async fn process_response(&mut self, response: Response) -> Result<Inbound> {
        let Some(key) = self.transactions.match_response(&response) else {
            debug!(status = response.status_code(), "Dropping response that matches no transaction");
            return Ok(Inbound::Absorbed);
        };

        let (state, ack, remote) = self.transactions.update(&key, |tx| (tx.state(), tx.ack.clone(), tx.remote))?;
        match state {
            TransactionState::Calling | TransactionState::Trying | TransactionState::Proceeding => {
                trace!(id = %key, status = response.status_code(), "Response matched");
                let recorded = response.clone();
                self.transactions.update(&key, |tx| tx.record_response(recorded))?;
                Ok(Inbound::Response(key, response))
            }
            _ => {
                if let Some(ack) = ack.filter(|_| response.status.is_final()) {
                    debug!(id = %key, "Final response retransmission, resending ACK");
                    self.transport
                        .send_message(Message::Request(ack), remote)
                        .await?;
                }
                Ok(Inbound::Absorbed)
            }
        }
    }
}
