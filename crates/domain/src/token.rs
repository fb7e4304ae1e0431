//! Opaque bearer token codec.
//!
//! Tokens are base64-encoded JSON claims with a fixed one-hour expiry.
//! There is no signing or encryption: the token is a transport convenience
//! for the client process, not a security boundary. Anything that crosses
//! a trust boundary must add integrity protection on top.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::user::User;

/// Fixed token lifetime.
pub const TOKEN_TTL_SECONDS: i64 = 3600;

/// Claims carried inside a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The subject user's identifier.
    pub user_id: String,
    /// Login email at issue time.
    pub email: String,
    /// Display name at issue time.
    pub name: String,
    /// Tier at issue time.
    pub tier: String,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Reasons a token fails to decode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not valid base64/JSON in the expected shape.
    #[error("malformed token")]
    Malformed,

    /// The token decoded but its expiry has passed.
    #[error("token expired")]
    Expired,
}

impl TokenClaims {
    /// Serializes the user's attributes plus issue time and the fixed TTL
    /// into an opaque token string.
    #[must_use]
    pub fn issue(user: &User, now: DateTime<Utc>) -> String {
        let claims = Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            tier: user.tier.clone(),
            issued_at: now,
            expires_at: now + Duration::seconds(TOKEN_TTL_SECONDS),
        };
        // Serializing a struct of plain fields cannot fail.
        let json = serde_json::to_vec(&claims).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decodes a token, rejecting malformed payloads and expired claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] when the payload cannot be parsed
    /// and [`TokenError::Expired`] when `expires_at` has passed.
    pub fn decode(token: &str, now: DateTime<Utc>) -> Result<Self, TokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Self = serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;
        if claims.expires_at < now {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Returns true iff the token decodes and has not expired.
    #[must_use]
    pub fn is_valid(token: &str, now: DateTime<Utc>) -> bool {
        Self::decode(token, now).is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::user::NewUser;

    fn user() -> User {
        NewUser {
            email: "a@example.com".to_string(),
            name: "Alice".to_string(),
            password: "pw".to_string(),
            phone: None,
        }
        .into_user("basic", Utc::now())
    }

    #[test]
    fn test_issue_and_decode() {
        let user = user();
        let now = Utc::now();
        let token = TokenClaims::issue(&user, now);

        let claims = TokenClaims::decode(&token, now).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(
            claims.expires_at - claims.issued_at,
            Duration::seconds(TOKEN_TTL_SECONDS)
        );
        assert!(TokenClaims::is_valid(&token, now));
    }

    #[test]
    fn test_expired_token_rejected() {
        let user = user();
        let now = Utc::now();
        let token = TokenClaims::issue(&user, now);

        let later = now + Duration::seconds(TOKEN_TTL_SECONDS + 1);
        assert_eq!(TokenClaims::decode(&token, later), Err(TokenError::Expired));
        assert!(!TokenClaims::is_valid(&token, later));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let now = Utc::now();
        assert_eq!(
            TokenClaims::decode("not a token", now),
            Err(TokenError::Malformed)
        );
        let garbage = URL_SAFE_NO_PAD.encode(b"{\"nope\":1}");
        assert_eq!(
            TokenClaims::decode(&garbage, now),
            Err(TokenError::Malformed)
        );
    }
}
