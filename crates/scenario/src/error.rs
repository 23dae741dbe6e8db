use thiserror::Error;

/// A type alias for handling `Result`s with `ScenarioError`
pub type Result<T> = std::result::Result<T, ScenarioError>;

/// Errors that stop a scenario from being loaded or run
///
/// A scenario that runs but fails its checks is not an error; see
/// [`crate::outcome::ScenarioOutcome`].
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid scenario file: {0}")]
    Toml(#[from] toml::de::Error),

    /// The setup string is not a valid UA command line
    #[error("Invalid setup arguments: {0}")]
    Setup(String),

    #[error("Invalid header pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A templated response header could not be parsed
    #[error("Invalid response header '{line}': {reason}")]
    ResponseHeader { line: String, reason: String },

    #[error("Transaction error: {0}")]
    Transaction(#[from] sipconf_transaction_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] sipconf_sip_transport::Error),

    #[error("SIP message error: {0}")]
    SipCore(#[from] sipconf_sip_core::Error),

    #[error("Session timer error: {0}")]
    SessionTimer(#[from] sipconf_session_timer::SessionTimerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
