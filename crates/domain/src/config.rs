//! Administrative site configuration.

use serde::{Deserialize, Serialize};

/// Site-wide configuration record managed from the admin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// When true, the site shows a maintenance notice and blocks writes.
    pub maintenance_mode: bool,
    /// Optional banner announcement shown to all users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement: Option<String>,
    /// ISO currency code used for prices.
    pub currency: String,
    /// Maximum number of ads shown in the featured strip.
    pub featured_limit: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            maintenance_mode: false,
            announcement: None,
            currency: "USD".to_string(),
            featured_limit: 8,
        }
    }
}
