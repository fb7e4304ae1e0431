//! Souk Application - session and catalog state management
//!
//! This crate owns the two stateful managers of the marketplace core:
//!
//! - [`session::SessionManager`]: the authentication state machine (login,
//!   two-factor, guest mode, logout, background expiry checking).
//! - [`catalog::CatalogStore`]: the synchronized in-memory snapshot of
//!   ads, users, categories, tiers and config, mutated strictly through
//!   the persistence collaborator.
//!
//! The collaborator itself is abstracted behind the port traits in
//! [`ports`]; adapters live in `souk-infrastructure`.

pub mod catalog;
pub mod error;
pub mod ports;
pub mod session;

pub use catalog::{CatalogStore, LikeOutcome, LoadState};
pub use error::{ApplicationError, ApplicationResult};
pub use session::{
    AuthState, ExpiryWatch, LoginOutcome, LogoutReason, PendingAction, SessionManager,
    EXPIRY_CHECK_INTERVAL,
};
