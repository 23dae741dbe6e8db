use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::transaction::{TransactionKey, TransactionKind, TransactionState};

/// A type alias for handling `Result`s with `Error`
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the transaction layer
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure while sending
    #[error("Transport error: {0}")]
    Transport(#[from] sipconf_sip_transport::Error),

    /// A message lacked what a transaction needs (Via branch, CSeq, ...)
    #[error("SIP message error: {0}")]
    SipCore(#[from] sipconf_sip_core::Error),

    /// No final response, ACK or request arrived in time
    #[error("Timed out after {after:?} waiting for {waiting_for}")]
    Timeout {
        waiting_for: String,
        after: Duration,
    },

    /// The remote sent bytes that do not parse as a SIP message
    #[error("Malformed message from {source_addr}: {detail}")]
    MalformedMessage {
        detail: String,
        /// Received text, lossily decoded
        raw: String,
        source_addr: SocketAddr,
    },

    /// A state machine was asked to make a transition RFC 3261 does not allow
    #[error("Invalid state transition for {kind:?}: {from:?} -> {to:?}")]
    InvalidStateTransition {
        kind: TransactionKind,
        from: TransactionState,
        to: TransactionState,
    },

    /// No transaction with this key
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionKey),

    /// A transaction with this key is already active
    #[error("Transaction already exists: {0}")]
    TransactionExists(TransactionKey),

    /// The request cannot start a transaction of this kind
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The transport event channel closed
    #[error("Transport event channel closed")]
    ChannelClosed,
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedMessage { .. })
    }
}
