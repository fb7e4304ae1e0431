//! User account types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::generate_id;

/// Account status as stored on the user record.
///
/// Status is mutated only by administrative operations (ban/unban); normal
/// profile updates never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UserStatus {
    /// Account is in good standing.
    #[default]
    Active,
    /// Account has been banned by an administrator.
    Banned {
        /// Reason recorded when the ban was applied.
        reason: String,
    },
}

impl UserStatus {
    /// Returns true if the account is banned.
    #[must_use]
    pub const fn is_banned(&self) -> bool {
        matches!(self, Self::Banned { .. })
    }
}

/// Aggregated seller reputation, recomputed from the full review set of all
/// the seller's ads after every review mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Reputation {
    /// Mean stored rating across all reviews on all of this seller's ads.
    pub rating: f64,
    /// Total number of reviews across all of this seller's ads.
    pub review_count: usize,
}

/// Cloud synchronization preferences carried on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CloudSync {
    /// Whether sync is enabled for this account.
    pub enabled: bool,
    /// Selected provider identifier, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// A marketplace user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: String,
    /// Login email, unique across the store.
    pub email: String,
    /// Public display name.
    pub name: String,
    /// Name of the tier this account belongs to.
    pub tier: String,
    /// Account standing.
    #[serde(flatten)]
    pub status: UserStatus,
    /// Aggregated seller reputation.
    pub reputation: Reputation,
    /// Two-factor secret; presence means two-factor is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_factor_secret: Option<String>,
    /// Optional phone number used for phone login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Cloud sync preferences.
    #[serde(default)]
    pub cloud_sync: CloudSync,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns true if two-factor authentication is enabled.
    #[must_use]
    pub const fn has_two_factor(&self) -> bool {
        self.two_factor_secret.is_some()
    }

    /// Returns true if the account is banned.
    #[must_use]
    pub const fn is_banned(&self) -> bool {
        self.status.is_banned()
    }
}

/// Data required to register a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// Public display name.
    pub name: String,
    /// Plaintext password handed to the collaborator for storage.
    pub password: String,
    /// Optional phone number.
    pub phone: Option<String>,
}

impl NewUser {
    /// Validates the registration data.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed or required fields are
    /// empty.
    pub fn validate(&self) -> DomainResult<()> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(DomainError::InvalidEmail(self.email.clone()));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::EmptyField("name"));
        }
        if self.password.is_empty() {
            return Err(DomainError::EmptyField("password"));
        }
        Ok(())
    }

    /// Builds the initial account record: default tier, zero reputation,
    /// active status.
    #[must_use]
    pub fn into_user(self, default_tier: impl Into<String>, now: DateTime<Utc>) -> User {
        User {
            id: generate_id(),
            email: self.email,
            name: self.name,
            tier: default_tier.into(),
            status: UserStatus::Active,
            reputation: Reputation::default(),
            two_factor_secret: None,
            phone: self.phone,
            cloud_sync: CloudSync::default(),
            created_at: now,
        }
    }
}
