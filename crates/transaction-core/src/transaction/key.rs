use std::fmt;

use serde::{Deserialize, Serialize};

use sipconf_sip_core::types::{HeaderAccess, Method, Request, Response};

use crate::error::{Error, Result};

/// Identifies a transaction: (branch, Call-ID, CSeq method) plus the side
///
/// Branch and Call-ID are opaque and compared byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionKey {
    /// Top Via branch
    pub branch: String,
    /// Call-ID value
    pub call_id: String,
    /// CSeq method (INVITE for the ACK of a non-2xx)
    pub method: Method,
    /// Server transactions and client transactions never collide
    pub is_server: bool,
}

impl TransactionKey {
    pub fn new(branch: impl Into<String>, call_id: impl Into<String>, method: Method, is_server: bool) -> Self {
        TransactionKey {
            branch: branch.into(),
            call_id: call_id.into(),
            method,
            is_server,
        }
    }

    /// Key of the transaction a request belongs to
    ///
    /// An ACK is keyed as INVITE so that the ACK for a non-2xx final lands on
    /// the INVITE server transaction that sent it.
    pub fn from_request(request: &Request, is_server: bool) -> Result<Self> {
        let branch = request
            .first_via()?
            .branch()
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidRequest("top Via has no branch".to_string()))?;
        let call_id = request.call_id()?.0;
        let method = match request.cseq()?.method {
            Method::Ack => Method::Invite,
            method => method,
        };
        Ok(TransactionKey::new(branch, call_id, method, is_server))
    }

    /// Key of the client transaction a response belongs to
    pub fn from_response(response: &Response) -> Result<Self> {
        let branch = response
            .first_via()?
            .branch()
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidRequest("response top Via has no branch".to_string()))?;
        Ok(TransactionKey::new(
            branch,
            response.call_id()?.0,
            response.cseq()?.method,
            false,
        ))
    }
}

impl fmt::Display for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.branch,
            self.method,
            self.call_id,
            if self.is_server { "server" } else { "client" }
        )
    }
}
