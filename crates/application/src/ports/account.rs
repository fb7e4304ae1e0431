//! Account collaborator port

use std::future::Future;

use souk_domain::{NewUser, User};

use crate::ApplicationResult;

/// Port for account persistence and credential verification.
///
/// All operations are asynchronous and may fail with a domain-specific
/// reason code, which the managers propagate unchanged to their caller.
pub trait AccountRepository: Send + Sync {
    /// Looks up an account by credential match.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` when no account matches.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = ApplicationResult<User>> + Send;

    /// Verifies a two-factor code against the stored secret.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCode` when the code does not match, `NotFound` when
    /// the user does not exist.
    fn verify_two_factor(
        &self,
        user_id: &str,
        code: &str,
    ) -> impl Future<Output = ApplicationResult<User>> + Send;

    /// Creates a new account in the default tier with zero reputation.
    ///
    /// # Errors
    ///
    /// Returns `UserExists` when the email is already registered.
    fn register(&self, new_user: NewUser) -> impl Future<Output = ApplicationResult<User>> + Send;

    /// Looks up (or lazily provisions) an account from an external identity
    /// provider assertion.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be created or read.
    fn provider_login(
        &self,
        provider: &str,
        subject: &str,
    ) -> impl Future<Output = ApplicationResult<User>> + Send;

    /// Looks up an account by phone number and one-time code.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCode` on a code mismatch, `NotFound` when no account
    /// carries the phone number.
    fn phone_login(
        &self,
        phone: &str,
        code: &str,
    ) -> impl Future<Output = ApplicationResult<User>> + Send;

    /// Notifies the collaborator that the user signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the collaborator write fails.
    fn logout(&self, user_id: &str) -> impl Future<Output = ApplicationResult<()>> + Send;

    /// Re-reads an account from the source of truth.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails; an unknown id yields `Ok(None)`.
    fn get_current_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = ApplicationResult<Option<User>>> + Send;

    /// Persists an account update and returns the full updated entity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the account does not exist.
    fn update_user(&self, user: &User) -> impl Future<Output = ApplicationResult<User>> + Send;

    /// Lists all accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn list_users(&self) -> impl Future<Output = ApplicationResult<Vec<User>>> + Send;
}
