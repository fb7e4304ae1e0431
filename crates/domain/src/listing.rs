//! Ad listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::comment::Comment;
use crate::error::{DomainError, DomainResult};
use crate::id::generate_id;
use crate::review::{mean_rating, Review};
use crate::user::User;

/// Listing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdStatus {
    /// Visible and open for interaction.
    #[default]
    Active,
    /// Removed by moderation. Terminal: banned ads accumulate no further
    /// reports.
    Banned {
        /// Reason recorded when the ad was removed.
        reason: String,
    },
}

impl AdStatus {
    /// Returns true if the ad is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Seller identity captured by value when the ad is created.
///
/// Deliberately a snapshot, not a reference: later profile edits do not
/// rewrite existing listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerSnapshot {
    /// Seller's user id.
    pub id: String,
    /// Seller's display name at creation time.
    pub name: String,
    /// Seller's reputation rating at creation time.
    pub rating: f64,
}

impl SellerSnapshot {
    /// Captures the seller-facing attributes of a user.
    #[must_use]
    pub fn of(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            rating: user.reputation.rating,
        }
    }
}

/// A report filed against an ad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Reporting user's id.
    pub reporter_id: String,
    /// Free-text reason.
    pub reason: String,
    /// When the report was filed.
    pub created_at: DateTime<Utc>,
}

/// Mutable engagement counters on an ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AdStats {
    /// Aggregate like counter.
    pub likes: i64,
    /// View counter.
    pub views: u64,
}

/// A marketplace listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    /// Unique identifier.
    pub id: String,
    /// Listing title.
    pub title: String,
    /// Listing body.
    pub description: String,
    /// Asking price in the configured currency.
    pub price: f64,
    /// Category this ad belongs to.
    pub category_id: String,
    /// Seller identity, snapshotted at creation.
    pub seller: SellerSnapshot,
    /// Listing status.
    #[serde(flatten)]
    pub status: AdStatus,
    /// Comment tree.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Reviews on this ad.
    #[serde(default)]
    pub reviews: Vec<Review>,
    /// Open reports against this ad.
    #[serde(default)]
    pub reports: Vec<Report>,
    /// Engagement counters.
    #[serde(default)]
    pub stats: AdStats,
    /// Mean of the stored review ratings; kept in sync by
    /// [`Ad::recompute_rating`] after every review mutation.
    pub rating: f64,
    /// When the ad was created.
    pub created_at: DateTime<Utc>,
    /// When the ad was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Ad {
    /// Recomputes `rating` as the mean over the full review set.
    pub fn recompute_rating(&mut self) {
        self.rating = mean_rating(&self.reviews);
    }

    /// Returns true if the ad is active and has at least one open report,
    /// i.e. it belongs in the moderation queue.
    #[must_use]
    pub fn is_reported(&self) -> bool {
        self.status.is_active() && !self.reports.is_empty()
    }
}

/// Data required to create a new listing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAd {
    /// Listing title.
    pub title: String,
    /// Listing body.
    pub description: String,
    /// Asking price.
    pub price: f64,
    /// Category id.
    pub category_id: String,
}

impl NewAd {
    /// Validates the listing draft.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty title or a negative or non-finite
    /// price.
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::EmptyField("title"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::InvalidPrice(self.price));
        }
        Ok(())
    }

    /// Builds the ad record, snapshotting the seller by value.
    #[must_use]
    pub fn into_ad(self, seller: &User, now: DateTime<Utc>) -> Ad {
        Ad {
            id: generate_id(),
            title: self.title,
            description: self.description,
            price: self.price,
            category_id: self.category_id,
            seller: SellerSnapshot::of(seller),
            status: AdStatus::Active,
            comments: Vec::new(),
            reviews: Vec::new(),
            reports: Vec::new(),
            stats: AdStats::default(),
            rating: 0.0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::review::Review;
    use crate::user::NewUser;

    fn seller() -> User {
        NewUser {
            email: "s@example.com".to_string(),
            name: "Seller".to_string(),
            password: "pw".to_string(),
            phone: None,
        }
        .into_user("basic", Utc::now())
    }

    fn new_ad() -> NewAd {
        NewAd {
            title: "Bike".to_string(),
            description: "Rides fine".to_string(),
            price: 120.0,
            category_id: "c1".to_string(),
        }
    }

    #[test]
    fn test_validate_rejects_bad_drafts() {
        let mut untitled = new_ad();
        untitled.title = " ".to_string();
        assert!(matches!(
            untitled.validate(),
            Err(DomainError::EmptyField("title"))
        ));

        let mut negative = new_ad();
        negative.price = -1.0;
        assert!(matches!(
            negative.validate(),
            Err(DomainError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_into_ad_snapshots_seller() {
        let mut seller = seller();
        seller.reputation.rating = 4.5;
        let ad = new_ad().into_ad(&seller, Utc::now());

        assert_eq!(ad.seller.id, seller.id);
        assert_eq!(ad.seller.rating, 4.5);
        assert!(ad.status.is_active());
        assert_eq!(ad.rating, 0.0);
    }

    #[test]
    fn test_recompute_rating() {
        let seller = seller();
        let mut ad = new_ad().into_ad(&seller, Utc::now());

        ad.reviews
            .push(Review::from_submission("u1", "A", 10, "a", Utc::now()).unwrap());
        ad.reviews
            .push(Review::from_submission("u2", "B", 4, "b", Utc::now()).unwrap());
        ad.recompute_rating();
        assert_eq!(ad.rating, 3.5);
    }

    #[test]
    fn test_is_reported_requires_active() {
        let seller = seller();
        let mut ad = new_ad().into_ad(&seller, Utc::now());
        assert!(!ad.is_reported());

        ad.reports.push(Report {
            reporter_id: "u9".to_string(),
            reason: "spam".to_string(),
            created_at: Utc::now(),
        });
        assert!(ad.is_reported());

        ad.status = AdStatus::Banned {
            reason: "removed".to_string(),
        };
        assert!(!ad.is_reported());
    }
}
