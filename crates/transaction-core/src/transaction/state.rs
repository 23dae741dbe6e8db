use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The four RFC 3261 transaction state machines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Section 17.1.1
    InviteClient,
    /// Section 17.1.2
    NonInviteClient,
    /// Section 17.2.1
    InviteServer,
    /// Section 17.2.2
    NonInviteServer,
}

impl TransactionKind {
    pub fn is_server(&self) -> bool {
        matches!(self, TransactionKind::InviteServer | TransactionKind::NonInviteServer)
    }

    pub fn is_invite(&self) -> bool {
        matches!(self, TransactionKind::InviteClient | TransactionKind::InviteServer)
    }

    /// State a new transaction of this kind starts in
    pub fn initial_state(&self) -> TransactionState {
        match self {
            TransactionKind::InviteClient => TransactionState::Calling,
            TransactionKind::NonInviteClient | TransactionKind::NonInviteServer => TransactionState::Trying,
            TransactionKind::InviteServer => TransactionState::Proceeding,
        }
    }
}

/// Transaction states across all four machines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    /// INVITE client: request sent, nothing heard yet
    Calling,
    /// Non-INVITE client/server: request sent or received, no response yet
    Trying,
    /// A provisional response was sent or received
    Proceeding,
    /// A final response was sent or received; absorbing retransmissions
    Completed,
    /// INVITE server: ACK received for a non-2xx final
    Confirmed,
    /// Done; the transaction may be forgotten
    Terminated,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl TransactionState {
    /// Checks a transition against the state machine of `kind`
    pub fn validate_transition(kind: TransactionKind, from: Self, to: Self) -> Result<()> {
        use TransactionState::*;

        // Any machine may terminate, e.g. on transport failure
        if to == Terminated && from != Terminated {
            return Ok(());
        }
        let allowed = match kind {
            TransactionKind::InviteClient => matches!(
                (from, to),
                (Calling, Proceeding) | (Calling, Completed) | (Proceeding, Completed)
            ),
            TransactionKind::NonInviteClient => matches!(
                (from, to),
                (Trying, Proceeding) | (Trying, Completed) | (Proceeding, Completed)
            ),
            TransactionKind::InviteServer => matches!((from, to), (Proceeding, Completed) | (Completed, Confirmed)),
            TransactionKind::NonInviteServer => matches!(
                (from, to),
                (Trying, Proceeding) | (Trying, Completed) | (Proceeding, Completed)
            ),
        };
        if allowed {
            Ok(())
        } else {
            Err(Error::InvalidStateTransition { kind, from, to })
        }
    }

    pub fn is_terminated(&self) -> bool {
        *self == TransactionState::Terminated
    }
}
