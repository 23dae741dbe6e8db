//! # sipconf-transaction-core
//!
//! RFC 3261 transaction layer for the session-timer conformance tooling.
//!
//! - [`transaction`]: transaction keys, the four state machines and the
//!   per-transaction record
//! - [`matcher`]: the transaction table and request/response matching
//! - [`timer`]: T1/T2/T4 settings and the derived timers A through K
//! - [`manager`]: [`TransactionManager`], which sends requests and responses,
//!   retransmits over unreliable transports and matches retransmissions and ACKs
//! - [`builders`]: ACK construction for INVITE client transactions
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sipconf_sip_core::builder::SimpleRequestBuilder;
//! use sipconf_transaction_core::{TimerSettings, TransactionManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (transport, events) = sipconf_sip_transport::bind_udp("127.0.0.1:0".parse()?).await?;
//! let mut manager = TransactionManager::new(Arc::new(transport), events, TimerSettings::default());
//!
//! let options = SimpleRequestBuilder::new(sipconf_sip_core::Method::Options, "sip:127.0.0.1:5060")?
//!     .via("127.0.0.1:5070", "UDP", &sipconf_transaction_core::utils::generate_branch())
//!     .call_id("c1")
//!     .cseq(1)
//!     .build();
//! let response = manager.send_request(options, "127.0.0.1:5060".parse()?).await?;
//! println!("{}", response.status_code());
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod error;
pub mod manager;
pub mod matcher;
pub mod timer;
pub mod transaction;
pub mod utils;

pub use builders::{create_ack_for_2xx, create_ack_for_non2xx};
pub use error::{Error, Result};
pub use manager::{IncomingRequest, TransactionManager};
pub use matcher::TransactionMatcher;
pub use timer::TimerSettings;
pub use transaction::{Transaction, TransactionKey, TransactionKind, TransactionState};
