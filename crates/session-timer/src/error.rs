use thiserror::Error;

use sipconf_sip_core::StatusCode;

/// A type alias for handling `Result`s with `SessionTimerError`
pub type Result<T> = std::result::Result<T, SessionTimerError>;

/// Errors from session-timer negotiation and the UA drivers
#[derive(Error, Debug)]
pub enum SessionTimerError {
    /// Configuration values that RFC 4028 does not allow
    #[error("Invalid session-timer configuration: {0}")]
    InvalidConfig(String),

    /// The request target cannot be turned into a socket address
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// A response lacks what the procedure needs, e.g. a 422 without Min-SE
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The peer broke RFC 4028, e.g. rejected an interval it had asked for
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// The INVITE was answered with a final error response
    #[error("INVITE rejected with {} {}", .status.as_u16(), .reason)]
    Rejected { status: StatusCode, reason: String },

    /// Transaction layer failure, including timeouts
    #[error("Transaction error: {0}")]
    Transaction(#[from] sipconf_transaction_core::Error),

    #[error("SIP message error: {0}")]
    SipCore(#[from] sipconf_sip_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] sipconf_sip_transport::Error),
}

impl SessionTimerError {
    /// Whether the failure is a timeout rather than a wrong answer
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionTimerError::Transaction(e) if e.is_timeout())
    }
}
