//! Session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session for one user.
///
/// Exactly one session is active per client process; it is created on
/// successful login, registration, or guest entry and destroyed on logout
/// or expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The signed-in user's identifier.
    pub user_id: String,
    /// When the session was established.
    pub issued_at: DateTime<Utc>,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Returns true if the session has expired relative to `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Seconds remaining until expiry, clamped at zero.
    #[must_use]
    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}
