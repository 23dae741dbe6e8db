//! RFC 3261 transaction timers.
//!
//! Timer values derive from three base intervals held in [`TimerSettings`]:
//!
//! - **T1**: RTT estimate (500ms). Timers A and G start here and double.
//! - **T2**: cap for non-INVITE and response retransmission (4s).
//! - **T4**: how long a message may linger in the network (5s).
//!
//! ## Client transaction timers
//! - **Timer A** (INVITE): request retransmission, unreliable transports only
//! - **Timer B** (INVITE): transaction timeout, 64*T1
//! - **Timer D** (INVITE): absorbs retransmitted final responses
//! - **Timer E** (non-INVITE): request retransmission, capped at T2
//! - **Timer F** (non-INVITE): transaction timeout, 64*T1
//! - **Timer K** (non-INVITE): absorbs retransmitted final responses
//!
//! ## Server transaction timers
//! - **Timer G** (INVITE): final response retransmission
//! - **Timer H** (INVITE): wait for ACK, 64*T1
//! - **Timer I** (INVITE): absorbs retransmitted ACKs
//! - **Timer J** (non-INVITE): absorbs retransmitted requests

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Base intervals for the transaction timers
///
/// Deserializes from a table of millisecond values:
///
/// ```toml
/// t1_ms = 500
/// t2_ms = 4000
/// t4_ms = 5000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSettings {
    #[serde(rename = "t1_ms", with = "millis")]
    pub t1: Duration,
    #[serde(rename = "t2_ms", with = "millis")]
    pub t2: Duration,
    #[serde(rename = "t4_ms", with = "millis")]
    pub t4: Duration,
}

impl Default for TimerSettings {
    fn default() -> Self {
        TimerSettings {
            t1: Duration::from_millis(500),
            t2: Duration::from_secs(4),
            t4: Duration::from_secs(5),
        }
    }
}

impl TimerSettings {
    pub fn with_t1(mut self, t1: Duration) -> Self {
        self.t1 = t1;
        self
    }

    pub fn with_t2(mut self, t2: Duration) -> Self {
        self.t2 = t2;
        self
    }

    pub fn with_t4(mut self, t4: Duration) -> Self {
        self.t4 = t4;
        self
    }

    /// Interval before the `attempt`-th INVITE retransmission (attempt 0 is the first)
    pub fn timer_a(&self, attempt: u32) -> Duration {
        self.t1.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
    }

    /// INVITE client transaction timeout
    pub fn timer_b(&self) -> Duration {
        self.t1.saturating_mul(64)
    }

    /// Time an INVITE client transaction stays Completed on unreliable transports
    pub fn timer_d(&self) -> Duration {
        Duration::from_secs(32).max(self.timer_b())
    }

    /// Interval before the `attempt`-th non-INVITE retransmission, capped at T2
    pub fn timer_e(&self, attempt: u32) -> Duration {
        self.timer_a(attempt).min(self.t2)
    }

    /// Non-INVITE client transaction timeout
    pub fn timer_f(&self) -> Duration {
        self.timer_b()
    }

    /// Interval before the `attempt`-th final response retransmission, capped at T2
    pub fn timer_g(&self, attempt: u32) -> Duration {
        self.timer_e(attempt)
    }

    /// How long an INVITE server transaction waits for the ACK
    pub fn timer_h(&self) -> Duration {
        self.timer_b()
    }

    pub fn timer_i(&self) -> Duration {
        self.t4
    }

    pub fn timer_j(&self) -> Duration {
        self.timer_b()
    }

    pub fn timer_k(&self) -> Duration {
        self.t4
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = TimerSettings::default();
        assert_eq!(settings.t1, Duration::from_millis(500));
        assert_eq!(settings.timer_b(), Duration::from_secs(32));
        assert_eq!(settings.timer_h(), Duration::from_secs(32));
    }

    #[test]
    fn test_timer_a_doubles_and_e_caps() {
        let settings = TimerSettings::default();
        let a: Vec<u64> = (0..4).map(|n| settings.timer_a(n).as_millis() as u64).collect();
        assert_eq!(a, vec![500, 1000, 2000, 4000]);
        assert_eq!(settings.timer_e(5), Duration::from_secs(4));
        assert!(settings.timer_a(40) >= settings.timer_a(31));
    }

    #[test]
    fn test_scaled_settings() {
        let settings = TimerSettings::default().with_t1(Duration::from_millis(10)).with_t2(Duration::from_millis(40));
        assert_eq!(settings.timer_b(), Duration::from_millis(640));
        assert_eq!(settings.timer_g(3), Duration::from_millis(40));
        assert_eq!(settings.timer_d(), Duration::from_secs(32));
    }
}
