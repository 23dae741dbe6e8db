//! The simulated peer
//!
//! [`ScenarioPeer`] binds a transport, waits for each expected request from
//! the UA under test, checks it and answers with the templated response.
//! Retransmitted requests are answered from the server transaction, so a
//! step only ever sees new requests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use sipconf_sip_core::types::{Address, Contact, Method, Uri};
use sipconf_sip_transport::{bind_tcp, bind_udp, Transport, TransportEvent};
use sipconf_transaction_core::utils::generate_tag;
use sipconf_transaction_core::{Error as TransactionError, TimerSettings, TransactionManager};

use crate::check::RequestCheck;
use crate::error::Result;
use crate::outcome::{ScenarioFailure, ScenarioOutcome};
use crate::scenario::{ExpectedTransaction, Scenario};
use crate::setup::UaArgs;
use crate::template::build_response;

/// Transport the peer listens on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerTransport {
    #[default]
    Udp,
    Tcp,
}

/// Settings of the simulated peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Address to listen on; port 0 picks a free port
    pub bind_addr: SocketAddr,
    pub transport: PeerTransport,
    /// How long each step waits for a request
    pub timeout_ms: u64,
    pub timers: TimerSettings,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            transport: PeerTransport::Udp,
            timeout_ms: 5000,
            timers: TimerSettings::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_transport(mut self, transport: PeerTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_timers(mut self, timers: TimerSettings) -> Self {
        self.timers = timers;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Plays the peer side of scenarios
#[derive(Debug)]
pub struct ScenarioPeer {
    transactions: TransactionManager,
    config: ScenarioConfig,
    local_addr: SocketAddr,
    local_tag: String,
}

impl ScenarioPeer {
    /// Binds the configured transport
    pub async fn bind(config: ScenarioConfig) -> Result<Self> {
        let (transport, events): (Arc<dyn Transport>, mpsc::Receiver<TransportEvent>) = match config.transport {
            PeerTransport::Udp => {
                let (transport, events) = bind_udp(config.bind_addr).await?;
                (Arc::new(transport), events)
            }
            PeerTransport::Tcp => {
                let (transport, events) = bind_tcp(config.bind_addr).await?;
                (Arc::new(transport), events)
            }
        };
        let local_addr = transport.local_addr()?;
        info!(%local_addr, transport = ?config.transport, "Scenario peer listening");
        Ok(ScenarioPeer {
            transactions: TransactionManager::new(transport, events, config.timers),
            config,
            local_addr,
            local_tag: generate_tag(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// The scenario's UA options with `$PORT` set to this peer's port
    pub fn setup_args(&self, scenario: &Scenario) -> Result<UaArgs> {
        UaArgs::parse_setup(&scenario.setup, self.local_addr.port())
    }

    fn contact(&self) -> Contact {
        Contact::new(Address::new(Uri::from_socket_addr(Some("sipconf"), self.local_addr)))
    }

    /// Runs every expected transaction in order
    ///
    /// The first failing step ends the run. Invalid patterns, status codes
    /// or header lines and transport failures are errors, not outcomes.
    pub async fn run(&mut self, scenario: &Scenario) -> Result<ScenarioOutcome> {
        scenario.validate()?;
        let checks = scenario
            .transactions
            .iter()
            .map(RequestCheck::compile)
            .collect::<Result<Vec<_>>>()?;
        info!(name = %scenario.name, steps = checks.len(), "Running scenario");

        for (step, (expected, check)) in scenario.transactions.iter().zip(&checks).enumerate() {
            debug!(step, title = %expected.title, "Waiting for request");
            if let Err(failure) = self.run_step(step, expected, check).await? {
                warn!(step, title = %expected.title, %failure, "Scenario step failed");
                return Ok(ScenarioOutcome::Failed {
                    step,
                    title: expected.title.clone(),
                    failure,
                });
            }
        }

        info!(name = %scenario.name, "Scenario passed");
        Ok(ScenarioOutcome::Passed {
            steps: scenario.transactions.len(),
        })
    }

    async fn run_step(
        &mut self,
        step: usize,
        expected: &ExpectedTransaction,
        check: &RequestCheck,
    ) -> Result<std::result::Result<(), ScenarioFailure>> {
        let timeout = self.config.timeout();
        let incoming = match self.transactions.next_request(timeout).await {
            Ok(incoming) => incoming,
            Err(e) if e.is_timeout() => {
                return Ok(Err(ScenarioFailure::Timeout {
                    waiting_for: format!("request for '{}'", expected.title),
                    after: timeout,
                }));
            }
            Err(e) => return malformed_or_abort(e, format!("well-formed SIP request for '{}'", expected.title)),
        };

        let text = incoming.request.to_string();
        if let Err(failure) = check.check_request(&text) {
            return Ok(Err(failure));
        }

        let response = build_response(
            &incoming.request,
            expected.status_code()?,
            &self.local_tag,
            &self.contact(),
            &expected.response_headers,
        )?;
        info!(step, method = %incoming.request.method, status = expected.status, "Answering request");
        self.transactions.send_response(&incoming.key, response).await?;

        if !check.expects_follow_up() {
            return Ok(Ok(()));
        }

        let follow_up = if incoming.request.method == Method::Invite {
            match self.transactions.wait_for_ack(&incoming.key).await {
                Ok(ack) => ack,
                Err(e) if e.is_timeout() => {
                    return Ok(Err(ScenarioFailure::Timeout {
                        waiting_for: format!("ACK after {}", expected.status),
                        after: self.transactions.settings().timer_h(),
                    }));
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            match self.transactions.next_request(timeout).await {
                Ok(next) => next.request,
                Err(e) if e.is_timeout() => {
                    return Ok(Err(ScenarioFailure::Timeout {
                        waiting_for: format!("request after {}", expected.status),
                        after: timeout,
                    }));
                }
                Err(e) => return malformed_or_abort(e, format!("well-formed SIP request after {}", expected.status)),
            }
        };
        Ok(check.check_follow_up(&follow_up.to_string()))
    }

    pub async fn close(&self) -> Result<()> {
        Ok(self.transactions.close().await?)
    }
}

/// A message that failed to parse fails the step; other errors abort the run
fn malformed_or_abort<T>(error: TransactionError, expected: String) -> Result<std::result::Result<T, ScenarioFailure>> {
    match error {
        TransactionError::MalformedMessage { detail, raw, .. } => Ok(Err(ScenarioFailure::Mismatch {
            expected,
            actual: format!("{} ({})", raw, detail),
        })),
        other => Err(other.into()),
    }
}
