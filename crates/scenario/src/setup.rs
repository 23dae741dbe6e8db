//! UA command-line parsing for scenario setup strings

use clap::Parser;

use sipconf_session_timer::{SessionTimerConfig, TimerUsage};
use sipconf_sip_core::Uri;

use crate::error::{Result, ScenarioError};

/// Placeholder for the simulated peer's port in setup strings
pub const PORT_PLACEHOLDER: &str = "$PORT";

/// Options the UA under test is started with
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "ua", no_binary_name = true)]
#[command(about = "UA under test")]
pub struct UaArgs {
    /// Run without a sound device
    #[arg(long)]
    pub null_audio: bool,

    /// Local SIP port
    #[arg(long)]
    pub local_port: Option<u16>,

    /// Session-Expires to offer, in seconds
    #[arg(long)]
    pub timer_se: Option<u32>,

    /// Smallest acceptable Session-Expires, in seconds
    #[arg(long)]
    pub timer_min_se: Option<u32>,

    /// Session timer usage (0-3 or inactive, optional, required, always)
    #[arg(long, value_parser = parse_timer_usage)]
    pub use_timer: Option<TimerUsage>,

    /// URI to call
    pub target: Option<String>,
}

fn parse_timer_usage(value: &str) -> std::result::Result<TimerUsage, String> {
    value.parse().map_err(|e: sipconf_session_timer::SessionTimerError| e.to_string())
}

impl UaArgs {
    /// Parses a setup string after substituting `$PORT`
    pub fn parse_setup(setup: &str, port: u16) -> Result<Self> {
        let setup = setup.replace(PORT_PLACEHOLDER, &port.to_string());
        UaArgs::try_parse_from(setup.split_whitespace()).map_err(|e| ScenarioError::Setup(e.to_string()))
    }

    /// Session-timer policy these options describe
    pub fn session_timer_config(&self) -> Result<SessionTimerConfig> {
        let mut config = SessionTimerConfig::default();
        if let Some(usage) = self.use_timer {
            config = config.with_usage(usage);
        }
        if let Some(min_se) = self.timer_min_se {
            config = config.with_min_se(min_se);
        }
        if let Some(session_expires) = self.timer_se {
            config = config.with_session_expires(session_expires);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn target_uri(&self) -> Result<Option<Uri>> {
        Ok(self.target.as_deref().map(str::parse).transpose()?)
    }
}
