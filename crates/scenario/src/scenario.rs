//! Declarative scenario model
//!
//! A scenario names the command line the UA under test is started with and
//! the ordered requests the simulated peer expects from it:
//!
//! ```toml
//! name = "Session timers retry after 422"
//! setup = "--null-audio sip:127.0.0.1:$PORT --timer-min-se 100 --timer-se 1000"
//!
//! [[transactions]]
//! title = "INVITE with SE too small"
//! status = 422
//! include = ['Session-Expires:\s*1000']
//! response_headers = ["Min-SE: 2000"]
//! expect = "ACK sip"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use sipconf_sip_core::StatusCode;

use crate::error::{Result, ScenarioError};

/// A complete scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// UA command line; `$PORT` is replaced with the peer's port
    pub setup: String,
    /// Expected exchanges, in order
    pub transactions: Vec<ExpectedTransaction>,
}

/// One request the peer waits for and the response it answers with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedTransaction {
    pub title: String,
    /// Status code of the response
    pub status: u16,
    /// Patterns the request must match
    #[serde(default)]
    pub include: Vec<String>,
    /// Patterns the request must not match
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Extra `Name: value` lines appended to the response
    #[serde(default)]
    pub response_headers: Vec<String>,
    /// Pattern for the message that must follow the response
    #[serde(default)]
    pub expect: Option<String>,
}

impl ExpectedTransaction {
    pub fn new(title: impl Into<String>, status: u16) -> Self {
        ExpectedTransaction {
            title: title.into(),
            status,
            include: Vec::new(),
            exclude: Vec::new(),
            response_headers: Vec::new(),
            expect: None,
        }
    }

    pub fn with_include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn with_response_header(mut self, line: impl Into<String>) -> Self {
        self.response_headers.push(line.into());
        self
    }

    pub fn with_expect(mut self, pattern: impl Into<String>) -> Self {
        self.expect = Some(pattern.into());
        self
    }

    /// The response status, which must be final
    pub fn status_code(&self) -> Result<StatusCode> {
        let status = StatusCode::from_u16(self.status)?;
        if !status.is_final() {
            return Err(ScenarioError::Config(format!(
                "'{}' answers with provisional status {}",
                self.title, self.status
            )));
        }
        Ok(status)
    }
}

impl Scenario {
    pub fn new(name: impl Into<String>, setup: impl Into<String>) -> Self {
        Scenario {
            name: name.into(),
            setup: setup.into(),
            transactions: Vec::new(),
        }
    }

    pub fn with_transaction(mut self, transaction: ExpectedTransaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    /// Parses and validates a TOML scenario
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(text)?;
        scenario.validate()?;
        debug!(name = %scenario.name, steps = scenario.transactions.len(), "Loaded scenario");
        Ok(scenario)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks that there is something to run and every status is a final response
    pub fn validate(&self) -> Result<()> {
        if self.transactions.is_empty() {
            return Err(ScenarioError::Config(format!("scenario '{}' has no transactions", self.name)));
        }
        for transaction in &self.transactions {
            transaction.status_code()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETRY_AFTER_422: &str = r#"
name = "Session timers retry after 422"
setup = "--null-audio sip:127.0.0.1:$PORT --timer-min-se 100 --timer-se 1000"

[[transactions]]
title = "INVITE with SE too small"
status = 422
include = ['Session-Expires:\s*1000']
exclude = []
response_headers = ["Min-SE: 2000"]
expect = "ACK sip"

[[transactions]]
title = "Retrying with acceptable SE"
status = 200
include = ['Session-Expires:\s*2000', 'Min-SE:\s*2000']
response_headers = ["Session-Expires: 2000;refresher=uac"]
"#;

    #[test]
    fn test_load_from_toml() {
        let scenario = Scenario::from_toml_str(RETRY_AFTER_422).unwrap();
        assert_eq!(scenario.transactions.len(), 2);

        let first = &scenario.transactions[0];
        assert_eq!(first.status, 422);
        assert_eq!(first.include, vec![r"Session-Expires:\s*1000".to_string()]);
        assert_eq!(first.expect.as_deref(), Some("ACK sip"));

        let second = &scenario.transactions[1];
        assert!(second.exclude.is_empty());
        assert_eq!(second.expect, None);
    }

    #[test]
    fn test_builders_match_toml() {
        let built = Scenario::new(
            "Session timers retry after 422",
            "--null-audio sip:127.0.0.1:$PORT --timer-min-se 100 --timer-se 1000",
        )
        .with_transaction(
            ExpectedTransaction::new("INVITE with SE too small", 422)
                .with_include(r"Session-Expires:\s*1000")
                .with_response_header("Min-SE: 2000")
                .with_expect("ACK sip"),
        )
        .with_transaction(
            ExpectedTransaction::new("Retrying with acceptable SE", 200)
                .with_include(r"Session-Expires:\s*2000")
                .with_include(r"Min-SE:\s*2000")
                .with_response_header("Session-Expires: 2000;refresher=uac"),
        );
        assert_eq!(built, Scenario::from_toml_str(RETRY_AFTER_422).unwrap());
    }

    #[test]
    fn test_rejects_empty_and_provisional() {
        let empty = Scenario::new("empty", "");
        assert!(matches!(empty.validate(), Err(ScenarioError::Config(_))));

        let provisional = Scenario::new("ringing", "").with_transaction(ExpectedTransaction::new("ring", 180));
        assert!(matches!(provisional.validate(), Err(ScenarioError::Config(_))));

        let bogus = Scenario::new("bogus", "").with_transaction(ExpectedTransaction::new("bogus", 999));
        assert!(matches!(bogus.validate(), Err(ScenarioError::SipCore(_))));
    }

    #[test]
    fn test_missing_status_is_toml_error() {
        let text = "name = \"x\"\nsetup = \"\"\n[[transactions]]\ntitle = \"t\"\n";
        assert!(matches!(Scenario::from_toml_str(text), Err(ScenarioError::Toml(_))));
    }
}
