//! Background session-expiry watchdog.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::ports::{AccountRepository, Clock};

use super::SessionManager;

/// Default period between expiry checks.
pub const EXPIRY_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Guard for the recurring expiry-check task.
///
/// The task runs for the lifetime of the guard; [`ExpiryWatch::stop`] or
/// dropping the guard aborts it, so tearing down the owning component
/// cannot leak a timer firing against a stale session.
#[derive(Debug)]
pub struct ExpiryWatch {
    handle: JoinHandle<()>,
}

impl ExpiryWatch {
    /// Stops the watchdog.
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// Returns true once the task has fully terminated.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ExpiryWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub(super) fn spawn<A, C>(manager: SessionManager<A, C>, period: Duration) -> ExpiryWatch
where
    A: AccountRepository + 'static,
    C: Clock + 'static,
{
    debug!(period_secs = period.as_secs(), "expiry watchdog started");
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            manager.check_expiry().await;
        }
    });
    ExpiryWatch { handle }
}
