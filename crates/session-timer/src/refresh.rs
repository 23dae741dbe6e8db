//! Refresh and expiry schedule of an established session timer

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use sipconf_sip_core::types::Refresher;

/// Upper bound on how much earlier than the interval the non-refresher gives up, seconds
const EXPIRY_GRACE_CAP: u32 = 32;

/// A negotiated session timer seen from one side of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimerSchedule {
    /// Agreed Session-Expires, seconds
    pub session_expires: u32,
    /// Who sends the refreshes
    pub refresher: Refresher,
    /// Which side this schedule belongs to
    pub local_role: Refresher,
}

impl SessionTimerSchedule {
    pub fn new(session_expires: u32, refresher: Refresher, local_role: Refresher) -> Self {
        SessionTimerSchedule {
            session_expires,
            refresher,
            local_role,
        }
    }

    pub fn is_local_refresher(&self) -> bool {
        self.refresher == self.local_role
    }

    /// When the refresher sends a refresh: half the interval
    pub fn refresh_after(&self) -> Duration {
        Duration::from_millis(u64::from(self.session_expires) * 500)
    }

    /// When the other side considers the session gone: the interval minus
    /// the smaller of 32 seconds and a third of the interval
    pub fn expire_after(&self) -> Duration {
        let grace = EXPIRY_GRACE_CAP.min(self.session_expires / 3);
        Duration::from_secs(u64::from(self.session_expires - grace))
    }

    /// The next deadline that matters to this side
    pub fn next_action(&self) -> SessionTimerEvent {
        if self.is_local_refresher() {
            SessionTimerEvent::RefreshNeeded
        } else {
            SessionTimerEvent::SessionExpired
        }
    }

    fn deadline(&self) -> Duration {
        if self.is_local_refresher() {
            self.refresh_after()
        } else {
            self.expire_after()
        }
    }
}

/// What a running session timer reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTimerEvent {
    /// This side must refresh the session now
    RefreshNeeded,
    /// No refresh arrived in time; the session should be torn down
    SessionExpired,
}

/// A running session timer
///
/// Fires one event per period; [`SessionRefreshTimer::refreshed`] restarts
/// the period, e.g. after a refresh was sent or received. Dropping the handle
/// stops the timer.
#[derive(Debug)]
pub struct SessionRefreshTimer {
    reset: watch::Sender<SessionTimerSchedule>,
    task: JoinHandle<()>,
}

impl SessionRefreshTimer {
    /// Starts the timer; events arrive on the returned receiver
    ///
    /// `unit` is the length of one second of the schedule, so tests can run
    /// a 2000 second session in milliseconds.
    pub fn start(schedule: SessionTimerSchedule, unit: Duration) -> (Self, mpsc::Receiver<SessionTimerEvent>) {
        let (events_tx, events_rx) = mpsc::channel(8);
        let (reset_tx, mut reset_rx) = watch::channel(schedule);

        let task = tokio::spawn(async move {
            loop {
                let current = *reset_rx.borrow_and_update();
                let deadline = Instant::now() + scale(current.deadline(), unit);
                debug!(?current, "Session timer armed");
                tokio::select! {
                    changed = reset_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = sleep(deadline.saturating_duration_since(Instant::now())) => {
                        let event = current.next_action();
                        info!(?event, session_expires = current.session_expires, "Session timer fired");
                        if events_tx.send(event).await.is_err() {
                            break;
                        }
                        if event == SessionTimerEvent::SessionExpired {
                            break;
                        }
                        // A refresher keeps firing every half interval until told otherwise
                    }
                }
            }
        });

        (SessionRefreshTimer { reset: reset_tx, task }, events_rx)
    }

    /// Restarts the period, optionally with a renegotiated schedule
    pub fn refreshed(&self, schedule: Option<SessionTimerSchedule>) {
        self.reset.send_modify(|current| {
            if let Some(schedule) = schedule {
                *current = schedule;
            }
        });
    }

    pub fn schedule(&self) -> SessionTimerSchedule {
        *self.reset.borrow()
    }
}

impl Drop for SessionRefreshTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn scale(duration: Duration, unit: Duration) -> Duration {
    let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    unit.saturating_mul(millis) / 1000
}
