//! Souk Domain - Core marketplace types
//!
//! This crate defines the domain model for the Souk marketplace state core.
//! All types here are pure Rust with no I/O dependencies: entities, the
//! session record, the bearer-token codec, and the tree/rating helpers
//! that the managers in `souk-application` orchestrate.

pub mod category;
pub mod comment;
pub mod config;
pub mod error;
pub mod id;
pub mod listing;
pub mod moderation;
pub mod review;
pub mod session;
pub mod tier;
pub mod token;
pub mod user;

pub use category::Category;
pub use comment::{find_comment_mut, insert_reply, remove_comment, Comment};
pub use config::AdminConfig;
pub use error::{DomainError, DomainResult};
pub use id::generate_id;
pub use listing::{Ad, AdStats, AdStatus, NewAd, Report, SellerSnapshot};
pub use moderation::ModerationItem;
pub use review::{mean_rating, Review};
pub use session::Session;
pub use tier::Tier;
pub use token::{TokenClaims, TokenError, TOKEN_TTL_SECONDS};
pub use user::{CloudSync, NewUser, Reputation, User, UserStatus};
