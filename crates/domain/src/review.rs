//! Ad reviews and rating math.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::generate_id;

/// Submitted ratings use a 0..=10 scale; stored ratings are halved to the
/// displayed 5-point scale.
pub const MAX_SUBMITTED_RATING: u8 = 10;

/// A review left on an ad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier.
    pub id: String,
    /// Reviewer's user id.
    pub reviewer_id: String,
    /// Reviewer's display name at submission time.
    pub reviewer_name: String,
    /// Stored rating on the 5-point scale (submitted rating / 2.0).
    pub rating: f64,
    /// Review text.
    pub text: String,
    /// When the review was submitted.
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Creates a review from a submitted 0..=10 rating, halving it to the
    /// stored scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the rating exceeds the scale or the text is
    /// empty.
    pub fn from_submission(
        reviewer_id: impl Into<String>,
        reviewer_name: impl Into<String>,
        submitted_rating: u8,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if submitted_rating > MAX_SUBMITTED_RATING {
            return Err(DomainError::InvalidRating(submitted_rating));
        }
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::EmptyField("review text"));
        }
        Ok(Self {
            id: generate_id(),
            reviewer_id: reviewer_id.into(),
            reviewer_name: reviewer_name.into(),
            rating: f64::from(submitted_rating) / 2.0,
            text,
            created_at: now,
        })
    }
}

/// Mean of the stored ratings, or 0.0 for an empty set.
#[must_use]
pub fn mean_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = reviews.len() as f64;
    reviews.iter().map(|r| r.rating).sum::<f64>() / count
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_halves_rating() {
        let review = Review::from_submission("u1", "Alice", 10, "great", Utc::now()).unwrap();
        assert_eq!(review.rating, 5.0);

        let review = Review::from_submission("u1", "Alice", 7, "fine", Utc::now()).unwrap();
        assert_eq!(review.rating, 3.5);
    }

    #[test]
    fn test_submission_rejects_out_of_scale() {
        let err = Review::from_submission("u1", "Alice", 11, "x", Utc::now());
        assert!(matches!(err, Err(DomainError::InvalidRating(11))));
    }

    #[test]
    fn test_submission_rejects_empty_text() {
        let err = Review::from_submission("u1", "Alice", 5, "  ", Utc::now());
        assert!(matches!(err, Err(DomainError::EmptyField(_))));
    }

    #[test]
    fn test_mean_rating() {
        assert_eq!(mean_rating(&[]), 0.0);

        let reviews = vec![
            Review::from_submission("u1", "A", 10, "a", Utc::now()).unwrap(),
            Review::from_submission("u2", "B", 6, "b", Utc::now()).unwrap(),
        ];
        assert_eq!(mean_rating(&reviews), 4.0);
    }
}
