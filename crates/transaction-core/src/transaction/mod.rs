//! Transactions: key, state machines and the per-transaction record.

pub mod key;
pub mod state;

pub use key::TransactionKey;
pub use state::{TransactionKind, TransactionState};

use std::net::SocketAddr;

use tokio::time::Instant;
use tracing::debug;

use sipconf_sip_core::types::{Method, Request, Response};

use crate::error::Result;

/// One client or server transaction
///
/// Owns the request that created it and every response sent or received,
/// in order.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub key: TransactionKey,
    pub kind: TransactionKind,
    state: TransactionState,
    /// The request that created the transaction
    pub request: Request,
    /// Where requests go (client) or where responses go (server)
    pub remote: SocketAddr,
    responses: Vec<Response>,
    /// ACK sent (INVITE client) or received (INVITE server)
    pub ack: Option<Request>,
    /// When a Completed transaction stops absorbing retransmissions
    pub(crate) linger_until: Option<Instant>,
}

impl Transaction {
    /// Creates a transaction in the initial state of its kind
    pub fn new(key: TransactionKey, request: Request, remote: SocketAddr) -> Self {
        let is_invite = request.method == Method::Invite;
        let kind = match (key.is_server, is_invite) {
            (false, true) => TransactionKind::InviteClient,
            (false, false) => TransactionKind::NonInviteClient,
            (true, true) => TransactionKind::InviteServer,
            (true, false) => TransactionKind::NonInviteServer,
        };
        Transaction {
            key,
            kind,
            state: kind.initial_state(),
            request,
            remote,
            responses: Vec::new(),
            ack: None,
            linger_until: None,
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Moves to `to` when the state machine allows it; staying put is a no-op
    pub fn transition(&mut self, to: TransactionState) -> Result<()> {
        if self.state == to {
            return Ok(());
        }
        TransactionState::validate_transition(self.kind, self.state, to)?;
        debug!(id = %self.key, "State transition: {:?} -> {:?}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// Records a response sent or received
    pub fn record_response(&mut self, response: Response) {
        self.responses.push(response);
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn last_response(&self) -> Option<&Response> {
        self.responses.last()
    }

    /// The final (non-1xx) response, if any
    pub fn final_response(&self) -> Option<&Response> {
        self.responses.iter().rev().find(|r| r.status.is_final())
    }
}
