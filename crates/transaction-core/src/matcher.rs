//! Transaction table and message matching (RFC 3261 17.1.3 and 17.2.3)

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, trace};

use sipconf_sip_core::types::{HeaderAccess, Method, Request, Response};

use crate::error::{Error, Result};
use crate::transaction::{Transaction, TransactionKey, TransactionKind};

/// Live transactions indexed by key
#[derive(Debug, Default)]
pub struct TransactionMatcher {
    transactions: DashMap<TransactionKey, Transaction>,
}

impl TransactionMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transaction; a live transaction with the same key is an error
    pub fn insert(&self, transaction: Transaction) -> Result<()> {
        let key = transaction.key.clone();
        if self.transactions.contains_key(&key) {
            return Err(Error::TransactionExists(key));
        }
        debug!(id = %key, kind = ?transaction.kind, "Created transaction");
        self.transactions.insert(key, transaction);
        Ok(())
    }

    /// Server transaction a request belongs to
    ///
    /// An ACK resolves to the INVITE server transaction with the same branch
    /// (the ACK of a non-2xx), or failing that to the INVITE server
    /// transaction of the same call and CSeq number that sent a 2xx.
    pub fn match_request(&self, request: &Request) -> Option<TransactionKey> {
        let key = TransactionKey::from_request(request, true).ok()?;
        if self.transactions.contains_key(&key) {
            trace!(id = %key, "Request matched by branch");
            return Some(key);
        }
        if request.method == Method::Ack {
            return self.match_ack_for_2xx(request);
        }
        None
    }

    fn match_ack_for_2xx(&self, ack: &Request) -> Option<TransactionKey> {
        let call_id = ack.call_id().ok()?.0;
        let seq = ack.cseq().ok()?.seq;
        self.transactions
            .iter()
            .find(|entry| {
                let tx = entry.value();
                tx.kind == TransactionKind::InviteServer
                    && tx.key.call_id == call_id
                    && tx.request.cseq().is_ok_and(|c| c.seq == seq)
                    && tx.final_response().is_some_and(|r| r.status.is_success())
            })
            .map(|entry| entry.key().clone())
    }

    /// Client transaction a response belongs to
    pub fn match_response(&self, response: &Response) -> Option<TransactionKey> {
        let key = TransactionKey::from_response(response).ok()?;
        self.transactions.contains_key(&key).then_some(key)
    }

    /// A snapshot of a transaction
    pub fn get(&self, key: &TransactionKey) -> Option<Transaction> {
        self.transactions.get(key).map(|entry| entry.value().clone())
    }

    /// Runs `f` against a transaction in place
    pub fn update<R>(&self, key: &TransactionKey, f: impl FnOnce(&mut Transaction) -> R) -> Result<R> {
        let mut entry = self
            .transactions
            .get_mut(key)
            .ok_or_else(|| Error::TransactionNotFound(key.clone()))?;
        Ok(f(entry.value_mut()))
    }

    pub fn remove(&self, key: &TransactionKey) -> Option<Transaction> {
        self.transactions.remove(key).map(|(_, tx)| tx)
    }

    /// Drops transactions whose linger period ended before `now`
    pub fn purge_expired(&self, now: Instant) -> usize {
        let before = self.transactions.len();
        self.transactions
            .retain(|_, tx| tx.linger_until.is_none_or(|until| until > now));
        let purged = before - self.transactions.len();
        if purged > 0 {
            debug!("Purged {} finished transactions", purged);
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
