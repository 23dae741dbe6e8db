//! # sipconf-scenario
//!
//! Declarative SIP conformance scenarios and the simulated peer that plays
//! them against a UA under test.
//!
//! A [`Scenario`] holds the UA's setup command line and the ordered
//! transactions the peer expects. [`ScenarioPeer`] binds a transport, answers
//! each request with a templated response and reports a [`ScenarioOutcome`]
//! that tells a timeout apart from a mismatch.
//!
//! ```no_run
//! use sipconf_scenario::{Scenario, ScenarioConfig, ScenarioPeer};
//!
//! # async fn run() -> sipconf_scenario::Result<()> {
//! let scenario = Scenario::from_file("crates/scenario/scenarios/timer_retry_after_422.toml")?;
//! let mut peer = ScenarioPeer::bind(ScenarioConfig::default()).await?;
//!
//! // Start the UA under test with these options, then:
//! let ua_args = peer.setup_args(&scenario)?;
//! println!("UA target: {:?}", ua_args.target);
//!
//! let outcome = peer.run(&scenario).await?;
//! println!("{}: {}", scenario.name, outcome);
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod error;
pub mod logging;
pub mod outcome;
pub mod runner;
pub mod scenario;
pub mod setup;
pub mod template;

pub use check::RequestCheck;
pub use error::{Result, ScenarioError};
pub use logging::{setup_logging, LoggingConfig};
pub use outcome::{ScenarioFailure, ScenarioOutcome};
pub use runner::{PeerTransport, ScenarioConfig, ScenarioPeer};
pub use scenario::{ExpectedTransaction, Scenario};
pub use setup::UaArgs;
