//! Session-timer policy of one user agent

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use sipconf_sip_core::types::Refresher;

use crate::error::{Result, SessionTimerError};

/// Smallest Session-Expires or Min-SE RFC 4028 allows, in seconds
pub const ABS_MIN_SE: u32 = 90;

/// Session-Expires offered when nothing else is configured
pub const DEFAULT_SESSION_EXPIRES: u32 = 1800;

/// How much a UA insists on session timers
///
/// Parses from a name (`inactive`, `optional`, `required`, `always`) or the
/// numeric form `0`..`3` used on UA command lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerUsage {
    /// Timers disabled; no timer headers are sent or honoured
    Inactive,
    /// Timers used when the peer supports them
    #[default]
    Optional,
    /// The peer must support timers
    Required,
    /// Timers used even when the peer does not ask for them
    Always,
}

impl TimerUsage {
    pub fn is_enabled(&self) -> bool {
        *self != TimerUsage::Inactive
    }
}

impl fmt::Display for TimerUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerUsage::Inactive => "inactive",
            TimerUsage::Optional => "optional",
            TimerUsage::Required => "required",
            TimerUsage::Always => "always",
        };
        f.write_str(name)
    }
}

impl FromStr for TimerUsage {
    type Err = SessionTimerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "inactive" => Ok(TimerUsage::Inactive),
            "1" | "optional" => Ok(TimerUsage::Optional),
            "2" | "required" => Ok(TimerUsage::Required),
            "3" | "always" => Ok(TimerUsage::Always),
            other => Err(SessionTimerError::InvalidConfig(format!("unknown timer usage '{}'", other))),
        }
    }
}

/// Session-timer policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTimerConfig {
    pub usage: TimerUsage,
    /// Session-Expires to offer, seconds
    pub session_expires: u32,
    /// Smallest interval this UA accepts, seconds
    pub min_se: u32,
    /// Larger offers are reduced to this when set (UAS side)
    pub max_session_expires: Option<u32>,
    /// Refresher the UAS picks when the UAC supports timers but did not choose
    pub default_refresher: Refresher,
}

impl Default for SessionTimerConfig {
    fn default() -> Self {
        SessionTimerConfig {
            usage: TimerUsage::default(),
            session_expires: DEFAULT_SESSION_EXPIRES,
            min_se: ABS_MIN_SE,
            max_session_expires: None,
            default_refresher: Refresher::Uac,
        }
    }
}

impl SessionTimerConfig {
    pub fn with_usage(mut self, usage: TimerUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_session_expires(mut self, seconds: u32) -> Self {
        self.session_expires = seconds;
        self
    }

    pub fn with_min_se(mut self, seconds: u32) -> Self {
        self.min_se = seconds;
        self
    }

    pub fn with_max_session_expires(mut self, seconds: u32) -> Self {
        self.max_session_expires = Some(seconds);
        self
    }

    pub fn with_default_refresher(mut self, refresher: Refresher) -> Self {
        self.default_refresher = refresher;
        self
    }

    /// Checks the RFC 4028 bounds
    ///
    /// Min-SE must be at least 90 seconds and no larger than the offered
    /// Session-Expires, which in turn may not exceed a configured maximum.
    pub fn validate(&self) -> Result<()> {
        if self.min_se < ABS_MIN_SE {
            return Err(SessionTimerError::InvalidConfig(format!(
                "Min-SE {} is below the RFC 4028 minimum of {}",
                self.min_se, ABS_MIN_SE
            )));
        }
        if self.session_expires < self.min_se {
            return Err(SessionTimerError::InvalidConfig(format!(
                "Session-Expires {} is smaller than Min-SE {}",
                self.session_expires, self.min_se
            )));
        }
        if let Some(max) = self.max_session_expires {
            if max < self.min_se {
                return Err(SessionTimerError::InvalidConfig(format!(
                    "maximum Session-Expires {} is smaller than Min-SE {}",
                    max, self.min_se
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SessionTimerConfig::default();
        assert_eq!(config.session_expires, 1800);
        assert_eq!(config.min_se, 90);
        assert_eq!(config.usage, TimerUsage::Optional);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_bounds() {
        assert!(SessionTimerConfig::default().with_min_se(89).validate().is_err());
        assert!(SessionTimerConfig::default()
            .with_min_se(100)
            .with_session_expires(99)
            .validate()
            .is_err());
        assert!(SessionTimerConfig::default()
            .with_min_se(100)
            .with_session_expires(1000)
            .validate()
            .is_ok());
        assert!(SessionTimerConfig::default()
            .with_min_se(200)
            .with_max_session_expires(100)
            .validate()
            .is_err());
    }

    #[test]
    fn test_usage_from_str() {
        assert_eq!("2".parse::<TimerUsage>().unwrap(), TimerUsage::Required);
        assert_eq!("Always".parse::<TimerUsage>().unwrap(), TimerUsage::Always);
        assert!("sometimes".parse::<TimerUsage>().is_err());
        assert!(!TimerUsage::Inactive.is_enabled());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SessionTimerConfig =
            toml::from_str("usage = \"always\"\nmin_se = 2000\nsession_expires = 2000\ndefault_refresher = \"uas\"\n")
                .unwrap();
        assert_eq!(config.usage, TimerUsage::Always);
        assert_eq!(config.min_se, 2000);
        assert_eq!(config.default_refresher, Refresher::Uas);
        assert_eq!(config.max_session_expires, None);
    }
}
