//! User tier definitions.

use serde::{Deserialize, Serialize};

/// A named user rank controlling ad quota and feature access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Tier name, unique across the store and referenced by `User::tier`.
    pub name: String,
    /// Maximum number of simultaneously active ads.
    pub ad_quota: usize,
    /// Whether members of this tier may feature their ads.
    pub can_feature: bool,
    /// Monthly price in the configured currency; zero for the default tier.
    pub monthly_price: f64,
}

impl Tier {
    /// The tier every freshly registered account starts in.
    pub const DEFAULT_NAME: &'static str = "basic";

    /// Returns the built-in default tier set.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                name: Self::DEFAULT_NAME.to_string(),
                ad_quota: 3,
                can_feature: false,
                monthly_price: 0.0,
            },
            Self {
                name: "plus".to_string(),
                ad_quota: 15,
                can_feature: true,
                monthly_price: 4.99,
            },
            Self {
                name: "pro".to_string(),
                ad_quota: 100,
                can_feature: true,
                monthly_price: 14.99,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_include_default_tier() {
        let tiers = Tier::defaults();
        assert!(tiers.iter().any(|t| t.name == Tier::DEFAULT_NAME));
    }
}
