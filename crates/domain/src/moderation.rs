//! Derived moderation views.

use crate::listing::Ad;

/// One entry in the moderation queue.
///
/// Derived, never stored: the queue is recomputed from the ad set on every
/// access, so there is no stored state to drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationItem {
    /// The reported ad's id.
    pub ad_id: String,
    /// The reported ad's title.
    pub title: String,
    /// Number of open reports.
    pub report_count: usize,
    /// All report reasons, concatenated for display.
    pub reasons: String,
}

impl ModerationItem {
    /// Builds a queue entry from an ad, or `None` when the ad is not
    /// reported (inactive or report-free).
    #[must_use]
    pub fn from_ad(ad: &Ad) -> Option<Self> {
        if !ad.is_reported() {
            return None;
        }
        let reasons = ad
            .reports
            .iter()
            .map(|r| r.reason.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Some(Self {
            ad_id: ad.id.clone(),
            title: ad.title.clone(),
            report_count: ad.reports.len(),
            reasons,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::listing::{NewAd, Report};
    use crate::user::NewUser;
    use chrono::Utc;

    #[test]
    fn test_from_ad() {
        let seller = NewUser {
            email: "s@example.com".to_string(),
            name: "Seller".to_string(),
            password: "pw".to_string(),
            phone: None,
        }
        .into_user("basic", Utc::now());

        let mut ad = NewAd {
            title: "Lamp".to_string(),
            description: String::new(),
            price: 10.0,
            category_id: "c1".to_string(),
        }
        .into_ad(&seller, Utc::now());

        assert!(ModerationItem::from_ad(&ad).is_none());

        for reason in ["spam", "scam"] {
            ad.reports.push(Report {
                reporter_id: "u1".to_string(),
                reason: reason.to_string(),
                created_at: Utc::now(),
            });
        }

        let item = ModerationItem::from_ad(&ad).unwrap();
        assert_eq!(item.report_count, 2);
        assert_eq!(item.reasons, "spam; scam");
        assert_eq!(item.ad_id, ad.id);
    }
}
