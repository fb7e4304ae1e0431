//! Session lifecycle management.
//!
//! [`SessionManager`] owns the authentication state machine:
//!
//! ```text
//! Unauthenticated -> Authenticating -> { AwaitingTwoFactor,
//!                                        Authenticated,
//!                                        Guest } -> Unauthenticated
//! ```
//!
//! Network-shaped operations (login, register, two-factor, provider and
//! phone login) surface their failure reason to the caller and restore the
//! prior state, so a failed attempt never leaves a partial transition
//! behind.
//!
//! The manager is a cheap-clone handle: all state lives behind an
//! `Arc<RwLock<..>>`, so clones observe and mutate the same session.

mod watchdog;

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use souk_domain::{generate_id, NewUser, Session, TokenClaims, User, UserStatus};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{AccountRepository, Clock};

pub use watchdog::{ExpiryWatch, EXPIRY_CHECK_INTERVAL};

/// Authentication state of the client process.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// No identity established.
    Unauthenticated,
    /// A login-shaped call is in flight.
    Authenticating,
    /// Credentials matched an account with two-factor enabled; waiting for
    /// the code. No token has been issued.
    AwaitingTwoFactor {
        /// The account awaiting verification.
        user_id: String,
    },
    /// A real account is signed in with a live token.
    Authenticated {
        /// The signed-in account, cached from the collaborator.
        user: User,
        /// The active session record.
        session: Session,
        /// The issued bearer token.
        token: String,
    },
    /// An ephemeral, unpersisted guest identity is browsing.
    Guest {
        /// The synthetic guest identity.
        user: User,
    },
}

impl AuthState {
    /// Returns true if a real account is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Returns true for the guest state.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest { .. })
    }
}

/// Successful outcome of a credential login.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// A session was established.
    Authenticated(User),
    /// Credentials matched, but the account requires a two-factor code
    /// before any session exists.
    RequiresTwoFactor,
}

/// Why a session ended; recorded for display on the next load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user signed out.
    UserRequested,
    /// The background expiry check found the token no longer valid.
    SessionExpired,
    /// The signed-in account was banned.
    AccountSuspended,
}

impl LogoutReason {
    /// Stable snake_case identifier for display lookup.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserRequested => "user_requested",
            Self::SessionExpired => "session_expired",
            Self::AccountSuspended => "account_suspended",
        }
    }
}

/// A privileged action a guest attempted, remembered across the upgrade
/// prompt so it can resume after real authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Posting a new ad.
    PostAd,
    /// Commenting on an ad.
    Comment {
        /// The target ad.
        ad_id: String,
    },
    /// Liking an ad.
    Like {
        /// The target ad.
        ad_id: String,
    },
    /// Reviewing an ad.
    Review {
        /// The target ad.
        ad_id: String,
    },
}

#[derive(Debug)]
struct SessionState {
    auth: AuthState,
    logout_reason: Option<LogoutReason>,
    pending_action: Option<PendingAction>,
}

/// The authentication state machine.
///
/// Generic over the account collaborator and a [`Clock`] so expiry behavior
/// is testable without waiting out real token lifetimes.
#[derive(Debug)]
pub struct SessionManager<A, C> {
    accounts: Arc<A>,
    clock: Arc<C>,
    state: Arc<RwLock<SessionState>>,
}

impl<A, C> Clone for SessionManager<A, C> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            clock: Arc::clone(&self.clock),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A: AccountRepository, C: Clock> SessionManager<A, C> {
    /// Creates a manager in the `Unauthenticated` state.
    #[must_use]
    pub fn new(accounts: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            accounts,
            clock,
            state: Arc::new(RwLock::new(SessionState {
                auth: AuthState::Unauthenticated,
                logout_reason: None,
                pending_action: None,
            })),
        }
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` when no account matches, `AccountSuspended`
    /// when the account is banned. Failure restores the prior state.
    pub async fn login(&self, email: &str, password: &str) -> ApplicationResult<LoginOutcome> {
        let prior = self.begin_attempt().await;
        match self.try_login(email, password).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.restore(prior).await;
                Err(err)
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> ApplicationResult<LoginOutcome> {
        let user = self.accounts.login(email, password).await?;
        if user.is_banned() {
            return Err(ApplicationError::AccountSuspended);
        }
        if user.has_two_factor() {
            debug!(user_id = %user.id, "two-factor required, deferring token issue");
            let mut state = self.state.write().await;
            state.auth = AuthState::AwaitingTwoFactor { user_id: user.id };
            return Ok(LoginOutcome::RequiresTwoFactor);
        }
        let user = self.establish(user).await;
        Ok(LoginOutcome::Authenticated(user))
    }

    /// Verifies the two-factor code for the pending login.
    ///
    /// # Errors
    ///
    /// `Generic` outside `AwaitingTwoFactor`, `InvalidCode` on a mismatch;
    /// the pending state is kept so the user may retry.
    pub async fn verify_two_factor(&self, code: &str) -> ApplicationResult<User> {
        let prior = self.begin_attempt().await;
        let AuthState::AwaitingTwoFactor { ref user_id } = prior else {
            self.restore(prior).await;
            return Err(ApplicationError::Generic(
                "no two-factor verification pending".to_string(),
            ));
        };

        match self.accounts.verify_two_factor(user_id, code).await {
            Ok(user) if user.is_banned() => {
                self.restore(prior).await;
                Err(ApplicationError::AccountSuspended)
            }
            Ok(user) => Ok(self.establish(user).await),
            Err(err) => {
                self.restore(prior).await;
                Err(err)
            }
        }
    }

    /// Registers a new account and signs it in.
    ///
    /// # Errors
    ///
    /// `UserExists` when the email is taken, domain errors for invalid
    /// registration data. Failure restores the prior state.
    pub async fn register(&self, new_user: NewUser) -> ApplicationResult<User> {
        new_user.validate()?;
        let prior = self.begin_attempt().await;
        match self.accounts.register(new_user).await {
            Ok(user) => Ok(self.establish(user).await),
            Err(err) => {
                self.restore(prior).await;
                Err(err)
            }
        }
    }

    /// Signs in via an external identity provider assertion.
    ///
    /// # Errors
    ///
    /// Propagates collaborator failures; `AccountSuspended` for banned
    /// accounts. Failure restores the prior state.
    pub async fn provider_login(&self, provider: &str, subject: &str) -> ApplicationResult<User> {
        let prior = self.begin_attempt().await;
        match self.accounts.provider_login(provider, subject).await {
            Ok(user) if user.is_banned() => {
                self.restore(prior).await;
                Err(ApplicationError::AccountSuspended)
            }
            Ok(user) => Ok(self.establish(user).await),
            Err(err) => {
                self.restore(prior).await;
                Err(err)
            }
        }
    }

    /// Signs in with a phone number and one-time code.
    ///
    /// # Errors
    ///
    /// `InvalidCode` on a mismatch; `AccountSuspended` for banned accounts.
    /// Failure restores the prior state.
    pub async fn phone_login(&self, phone: &str, code: &str) -> ApplicationResult<User> {
        let prior = self.begin_attempt().await;
        match self.accounts.phone_login(phone, code).await {
            Ok(user) if user.is_banned() => {
                self.restore(prior).await;
                Err(ApplicationError::AccountSuspended)
            }
            Ok(user) => Ok(self.establish(user).await),
            Err(err) => {
                self.restore(prior).await;
                Err(err)
            }
        }
    }

    /// Enters guest mode with an ephemeral, unpersisted identity.
    ///
    /// Guests never touch the token codec and the collaborator is not
    /// consulted.
    pub async fn login_as_guest(&self) -> User {
        let suffix: u16 = rand::rng().random_range(1000..10_000);
        let id = generate_id();
        let user = User {
            email: format!("guest-{suffix}@local"),
            name: format!("Guest {suffix}"),
            id,
            tier: souk_domain::Tier::DEFAULT_NAME.to_string(),
            status: UserStatus::Active,
            reputation: souk_domain::Reputation::default(),
            two_factor_secret: None,
            phone: None,
            cloud_sync: souk_domain::CloudSync::default(),
            created_at: self.clock.now(),
        };
        let mut state = self.state.write().await;
        state.auth = AuthState::Guest { user: user.clone() };
        state.logout_reason = None;
        info!(guest = %user.name, "guest session started");
        user
    }

    /// Ends the session, optionally recording a reason for the next load.
    ///
    /// The collaborator is notified for real accounts; a notification
    /// failure is logged but never blocks the local teardown.
    pub async fn logout(&self, reason: Option<LogoutReason>) {
        let user_id = {
            let state = self.state.read().await;
            match &state.auth {
                AuthState::Authenticated { user, .. } => Some(user.id.clone()),
                _ => None,
            }
        };
        if let Some(id) = &user_id {
            if let Err(err) = self.accounts.logout(id).await {
                warn!(user_id = %id, reason = err.reason_code(), "collaborator logout failed");
            }
        }
        let mut state = self.state.write().await;
        state.auth = AuthState::Unauthenticated;
        state.logout_reason = reason;
        info!(
            user_id = user_id.as_deref().unwrap_or("-"),
            reason = reason.map_or("none", LogoutReason::as_str),
            "session ended"
        );
    }

    /// Re-reads the signed-in account from the collaborator and replaces
    /// the cached copy. A ban discovered here forces an immediate logout.
    ///
    /// # Errors
    ///
    /// `Generic` when no account is signed in, `NotFound` when the account
    /// vanished, `AccountSuspended` when it turned banned.
    pub async fn refresh_current_user(&self) -> ApplicationResult<User> {
        let user_id = self
            .current_user_id()
            .await
            .ok_or_else(|| ApplicationError::Generic("no account signed in".to_string()))?;

        let fresh = self
            .accounts
            .get_current_user(&user_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("user".to_string()))?;

        if fresh.is_banned() {
            self.logout(Some(LogoutReason::AccountSuspended)).await;
            return Err(ApplicationError::AccountSuspended);
        }

        let mut state = self.state.write().await;
        if let AuthState::Authenticated { user, .. } = &mut state.auth {
            *user = fresh.clone();
        }
        Ok(fresh)
    }

    /// Self-service profile update for the signed-in account.
    ///
    /// # Errors
    ///
    /// `Generic` when the update targets anything but the signed-in
    /// account; collaborator failures propagate.
    pub async fn update_profile(&self, updated: User) -> ApplicationResult<User> {
        let current_id = self
            .current_user_id()
            .await
            .ok_or_else(|| ApplicationError::Generic("no account signed in".to_string()))?;
        if updated.id != current_id {
            return Err(ApplicationError::Generic(
                "profile updates are limited to the signed-in account".to_string(),
            ));
        }
        let saved = self.accounts.update_user(&updated).await?;
        let mut state = self.state.write().await;
        if let AuthState::Authenticated { user, .. } = &mut state.auth {
            *user = saved.clone();
        }
        Ok(saved)
    }

    /// A guest attempted a privileged action: remember the intent and
    /// report whether the upgrade prompt should be shown.
    ///
    /// Returns false (and remembers nothing) outside guest mode.
    pub async fn begin_upgrade(&self, action: PendingAction) -> bool {
        let mut state = self.state.write().await;
        if state.auth.is_guest() {
            state.pending_action = Some(action);
            true
        } else {
            false
        }
    }

    /// The guest confirmed the upgrade prompt: guest state is cleared and
    /// the remembered action survives for after real authentication.
    pub async fn confirm_upgrade(&self) {
        let mut state = self.state.write().await;
        if state.auth.is_guest() {
            state.auth = AuthState::Unauthenticated;
            info!("guest upgrade confirmed, awaiting real authentication");
        }
    }

    /// The guest dismissed the upgrade prompt; the intent is dropped.
    pub async fn cancel_upgrade(&self) {
        let mut state = self.state.write().await;
        state.pending_action = None;
    }

    /// Takes the action remembered across a guest upgrade, if any.
    pub async fn take_pending_action(&self) -> Option<PendingAction> {
        self.state.write().await.pending_action.take()
    }

    /// Takes the reason recorded by the last logout, if any.
    pub async fn take_logout_reason(&self) -> Option<LogoutReason> {
        self.state.write().await.logout_reason.take()
    }

    /// Snapshot of the current authentication state.
    pub async fn auth_state(&self) -> AuthState {
        self.state.read().await.auth.clone()
    }

    /// The signed-in or guest identity, if any.
    pub async fn current_user(&self) -> Option<User> {
        match &self.state.read().await.auth {
            AuthState::Authenticated { user, .. } | AuthState::Guest { user } => {
                Some(user.clone())
            }
            _ => None,
        }
    }

    /// The signed-in or guest identity's id, if any.
    pub async fn current_user_id(&self) -> Option<String> {
        self.current_user().await.map(|u| u.id)
    }

    /// The active bearer token, if a real account is signed in.
    pub async fn token(&self) -> Option<String> {
        match &self.state.read().await.auth {
            AuthState::Authenticated { token, .. } => Some(token.clone()),
            _ => None,
        }
    }

    /// Returns true if a real account is signed in.
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.auth.is_authenticated()
    }

    /// Captures the current state and marks an attempt in flight.
    async fn begin_attempt(&self) -> AuthState {
        let mut state = self.state.write().await;
        std::mem::replace(&mut state.auth, AuthState::Authenticating)
    }

    /// Restores a captured state after a failed attempt.
    async fn restore(&self, prior: AuthState) {
        let mut state = self.state.write().await;
        state.auth = prior;
    }

    /// Issues a token and transitions to `Authenticated`.
    async fn establish(&self, user: User) -> User {
        let now = self.clock.now();
        let token = TokenClaims::issue(&user, now);
        // Claims were just issued, so decoding them cannot fail; fall back
        // to the fixed TTL if it somehow does.
        let expires_at = TokenClaims::decode(&token, now)
            .map_or(now + chrono::Duration::seconds(souk_domain::TOKEN_TTL_SECONDS), |c| {
                c.expires_at
            });
        let session = Session {
            user_id: user.id.clone(),
            issued_at: now,
            expires_at,
        };
        info!(user_id = %user.id, tier = %user.tier, "session established");
        let mut state = self.state.write().await;
        state.auth = AuthState::Authenticated {
            user: user.clone(),
            session,
            token,
        };
        state.logout_reason = None;
        user
    }

    /// One iteration of the background expiry check: force a logout when a
    /// token exists but no longer validates against the clock.
    pub(crate) async fn check_expiry(&self) {
        let expired = match &self.state.read().await.auth {
            AuthState::Authenticated { token, .. } => {
                !TokenClaims::is_valid(token, self.clock.now())
            }
            _ => false,
        };
        if expired {
            warn!("bearer token expired, forcing logout");
            self.logout(Some(LogoutReason::SessionExpired)).await;
        }
    }

    /// Spawns the recurring expiry check.
    ///
    /// The returned guard aborts the task when stopped or dropped, so a
    /// torn-down component cannot leak a timer firing against a stale
    /// session.
    #[must_use]
    pub fn spawn_expiry_watch(&self, period: Duration) -> ExpiryWatch
    where
        A: 'static,
        C: 'static,
    {
        watchdog::spawn(self.clone(), period)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::Clock;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    /// Minimal account collaborator for state-machine tests.
    #[derive(Default)]
    struct StubAccounts {
        users: Mutex<HashMap<String, (User, String)>>,
    }

    impl StubAccounts {
        fn with_user(user: User, password: &str) -> Self {
            let accounts = Self::default();
            accounts
                .users
                .lock()
                .unwrap()
                .insert(user.email.clone(), (user, password.to_string()));
            accounts
        }
    }

    impl AccountRepository for StubAccounts {
        async fn login(&self, email: &str, password: &str) -> ApplicationResult<User> {
            self.users
                .lock()
                .unwrap()
                .get(email)
                .filter(|(_, pw)| pw == password)
                .map(|(u, _)| u.clone())
                .ok_or(ApplicationError::InvalidCredentials)
        }

        async fn verify_two_factor(&self, user_id: &str, code: &str) -> ApplicationResult<User> {
            let users = self.users.lock().unwrap();
            let (user, _) = users
                .values()
                .find(|(u, _)| u.id == user_id)
                .ok_or_else(|| ApplicationError::NotFound("user".to_string()))?;
            if user.two_factor_secret.as_deref() == Some(code) {
                Ok(user.clone())
            } else {
                Err(ApplicationError::InvalidCode)
            }
        }

        async fn register(&self, new_user: NewUser) -> ApplicationResult<User> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&new_user.email) {
                return Err(ApplicationError::UserExists);
            }
            let password = new_user.password.clone();
            let user = new_user.into_user("basic", Utc::now());
            users.insert(user.email.clone(), (user.clone(), password));
            Ok(user)
        }

        async fn provider_login(&self, _provider: &str, subject: &str) -> ApplicationResult<User> {
            self.users
                .lock()
                .unwrap()
                .get(subject)
                .map(|(u, _)| u.clone())
                .ok_or_else(|| ApplicationError::NotFound("user".to_string()))
        }

        async fn phone_login(&self, phone: &str, _code: &str) -> ApplicationResult<User> {
            self.users
                .lock()
                .unwrap()
                .values()
                .find(|(u, _)| u.phone.as_deref() == Some(phone))
                .map(|(u, _)| u.clone())
                .ok_or_else(|| ApplicationError::NotFound("user".to_string()))
        }

        async fn logout(&self, _user_id: &str) -> ApplicationResult<()> {
            Ok(())
        }

        async fn get_current_user(&self, user_id: &str) -> ApplicationResult<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|(u, _)| u.id == user_id)
                .map(|(u, _)| u.clone()))
        }

        async fn update_user(&self, user: &User) -> ApplicationResult<User> {
            let mut users = self.users.lock().unwrap();
            let entry = users
                .get_mut(&user.email)
                .ok_or_else(|| ApplicationError::NotFound("user".to_string()))?;
            entry.0 = user.clone();
            Ok(user.clone())
        }

        async fn list_users(&self) -> ApplicationResult<Vec<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .map(|(u, _)| u.clone())
                .collect())
        }
    }

    fn alice() -> User {
        NewUser {
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            password: "pw".to_string(),
            phone: None,
        }
        .into_user("basic", Utc::now())
    }

    fn manager(accounts: StubAccounts) -> SessionManager<StubAccounts, FixedClock> {
        SessionManager::new(Arc::new(accounts), Arc::new(FixedClock(Utc::now())))
    }

    #[tokio::test]
    async fn test_wrong_password_leaves_state_untouched() {
        let mgr = manager(StubAccounts::with_user(alice(), "pw"));

        let err = mgr.login("alice@example.com", "wrong").await.unwrap_err();
        assert_eq!(err, ApplicationError::InvalidCredentials);
        assert_eq!(mgr.auth_state().await, AuthState::Unauthenticated);
        assert!(mgr.token().await.is_none());
    }

    #[tokio::test]
    async fn test_login_establishes_session() {
        let mgr = manager(StubAccounts::with_user(alice(), "pw"));

        let outcome = mgr.login("alice@example.com", "pw").await.unwrap();
        let LoginOutcome::Authenticated(user) = outcome else {
            panic!("expected direct authentication");
        };
        assert_eq!(user.email, "alice@example.com");
        assert!(mgr.is_authenticated().await);
        assert!(mgr.token().await.is_some());
    }

    #[tokio::test]
    async fn test_banned_account_cannot_login() {
        let mut user = alice();
        user.status = UserStatus::Banned {
            reason: "spam".to_string(),
        };
        let mgr = manager(StubAccounts::with_user(user, "pw"));

        let err = mgr.login("alice@example.com", "pw").await.unwrap_err();
        assert_eq!(err, ApplicationError::AccountSuspended);
        assert_eq!(mgr.auth_state().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_two_factor_defers_token() {
        let mut user = alice();
        user.two_factor_secret = Some("123456".to_string());
        let user_id = user.id.clone();
        let mgr = manager(StubAccounts::with_user(user, "pw"));

        let outcome = mgr.login("alice@example.com", "pw").await.unwrap();
        assert_eq!(outcome, LoginOutcome::RequiresTwoFactor);
        assert!(mgr.token().await.is_none());
        assert_eq!(
            mgr.auth_state().await,
            AuthState::AwaitingTwoFactor { user_id }
        );

        // Wrong code keeps the pending state.
        let err = mgr.verify_two_factor("000000").await.unwrap_err();
        assert_eq!(err, ApplicationError::InvalidCode);
        assert!(matches!(
            mgr.auth_state().await,
            AuthState::AwaitingTwoFactor { .. }
        ));

        // Correct code issues the token.
        mgr.verify_two_factor("123456").await.unwrap();
        assert!(mgr.is_authenticated().await);
        assert!(mgr.token().await.is_some());
    }

    #[tokio::test]
    async fn test_verify_without_pending_fails() {
        let mgr = manager(StubAccounts::default());
        let err = mgr.verify_two_factor("123456").await.unwrap_err();
        assert_eq!(err.reason_code(), "generic_failure");
        assert_eq!(mgr.auth_state().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_register_existing_email_fails() {
        let mgr = manager(StubAccounts::with_user(alice(), "pw"));
        let err = mgr
            .register(NewUser {
                email: "alice@example.com".to_string(),
                name: "Other".to_string(),
                password: "pw2".to_string(),
                phone: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, ApplicationError::UserExists);
        assert_eq!(mgr.auth_state().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_guest_mode_and_upgrade_prompt() {
        let mgr = manager(StubAccounts::with_user(alice(), "pw"));

        let guest = mgr.login_as_guest().await;
        assert!(mgr.auth_state().await.is_guest());
        assert!(mgr.token().await.is_none());
        assert_eq!(mgr.current_user_id().await, Some(guest.id));

        let shown = mgr
            .begin_upgrade(PendingAction::Comment {
                ad_id: "ad-1".to_string(),
            })
            .await;
        assert!(shown);

        mgr.confirm_upgrade().await;
        assert_eq!(mgr.auth_state().await, AuthState::Unauthenticated);

        mgr.login("alice@example.com", "pw").await.unwrap();
        assert_eq!(
            mgr.take_pending_action().await,
            Some(PendingAction::Comment {
                ad_id: "ad-1".to_string()
            })
        );
        assert_eq!(mgr.take_pending_action().await, None);
    }

    #[tokio::test]
    async fn test_upgrade_prompt_only_for_guests() {
        let mgr = manager(StubAccounts::with_user(alice(), "pw"));
        mgr.login("alice@example.com", "pw").await.unwrap();
        assert!(!mgr.begin_upgrade(PendingAction::PostAd).await);
    }

    #[tokio::test]
    async fn test_logout_records_reason() {
        let mgr = manager(StubAccounts::with_user(alice(), "pw"));
        mgr.login("alice@example.com", "pw").await.unwrap();

        mgr.logout(Some(LogoutReason::SessionExpired)).await;
        assert_eq!(mgr.auth_state().await, AuthState::Unauthenticated);
        assert_eq!(
            mgr.take_logout_reason().await,
            Some(LogoutReason::SessionExpired)
        );
        assert_eq!(mgr.take_logout_reason().await, None);
    }

    #[tokio::test]
    async fn test_refresh_detects_ban() {
        let accounts = StubAccounts::with_user(alice(), "pw");
        let mgr = manager(accounts);
        mgr.login("alice@example.com", "pw").await.unwrap();

        // Ban behind the manager's back.
        {
            let mut users = mgr.accounts.users.lock().unwrap();
            let (user, _) = users.get_mut("alice@example.com").unwrap();
            user.status = UserStatus::Banned {
                reason: "spam".to_string(),
            };
        }

        let err = mgr.refresh_current_user().await.unwrap_err();
        assert_eq!(err, ApplicationError::AccountSuspended);
        assert_eq!(mgr.auth_state().await, AuthState::Unauthenticated);
        assert_eq!(
            mgr.take_logout_reason().await,
            Some(LogoutReason::AccountSuspended)
        );
    }

    #[tokio::test]
    async fn test_update_profile_limited_to_self() {
        let mgr = manager(StubAccounts::with_user(alice(), "pw"));
        mgr.login("alice@example.com", "pw").await.unwrap();

        let mut other = alice();
        other.id = "someone-else".to_string();
        let err = mgr.update_profile(other).await.unwrap_err();
        assert_eq!(err.reason_code(), "generic_failure");

        let mut me = mgr.current_user().await.unwrap();
        me.name = "Alice Renamed".to_string();
        let saved = mgr.update_profile(me).await.unwrap();
        assert_eq!(saved.name, "Alice Renamed");
        assert_eq!(mgr.current_user().await.unwrap().name, "Alice Renamed");
    }

    #[tokio::test]
    async fn test_expired_token_forces_logout_on_check() {
        let user = alice();
        let accounts = StubAccounts::with_user(user, "pw");
        // Issue against a fixed clock, then check with a clone whose clock
        // sits past the token TTL.
        let issued_at = Utc::now() - chrono::Duration::hours(2);
        let mgr = SessionManager::new(Arc::new(accounts), Arc::new(FixedClock(issued_at)));
        mgr.login("alice@example.com", "pw").await.unwrap();
        assert!(mgr.is_authenticated().await);

        // Move the clock past expiry by swapping what `now` reports.
        let later = SessionManager {
            accounts: Arc::clone(&mgr.accounts),
            clock: Arc::new(FixedClock(issued_at + chrono::Duration::hours(2))),
            state: Arc::clone(&mgr.state),
        };
        later.check_expiry().await;

        assert_eq!(mgr.auth_state().await, AuthState::Unauthenticated);
        assert_eq!(
            mgr.take_logout_reason().await,
            Some(LogoutReason::SessionExpired)
        );
    }
}
