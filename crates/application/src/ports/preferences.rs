//! Local preference port

use std::collections::HashSet;
use std::future::Future;

use crate::ApplicationResult;

/// Port for locally persisted per-user preferences.
///
/// Currently this is the liked-ad set that keeps like toggling idempotent
/// per user: the aggregate counter on the ad and the set membership here
/// are flipped together by the catalog store.
pub trait PreferenceRepository: Send + Sync {
    /// Returns the set of ad ids the user has liked.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn liked_ads(
        &self,
        user_id: &str,
    ) -> impl Future<Output = ApplicationResult<HashSet<String>>> + Send;

    /// Adds or removes an ad id from the user's liked set.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_liked(
        &self,
        user_id: &str,
        ad_id: &str,
        liked: bool,
    ) -> impl Future<Output = ApplicationResult<()>> + Send;
}
