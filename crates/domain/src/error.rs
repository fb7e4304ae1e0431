//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// An email address is empty or structurally invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// A submitted rating is outside the accepted 0..=10 scale.
    #[error("invalid rating: {0}")]
    InvalidRating(u8),

    /// A required text field is empty.
    #[error("empty field: {0}")]
    EmptyField(&'static str),

    /// A monetary amount is negative or otherwise nonsensical.
    #[error("invalid price: {0}")]
    InvalidPrice(f64),

    /// An identifier is invalid or empty.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
