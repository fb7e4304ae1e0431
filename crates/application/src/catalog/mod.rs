//! Catalog snapshot management.
//!
//! [`CatalogStore`] owns the in-memory snapshot of ads, users, categories,
//! tiers and site config. The persistence collaborator is the source of
//! truth: every mutation is a read-modify-write against the collaborator
//! first, and the snapshot then takes the returned entity verbatim; the
//! cached state always reflects the last successful collaborator write and
//! is never speculative beyond it.
//!
//! The catalog write lock is held across each mutation's collaborator
//! round-trip, so two mutations of the same entity cannot interleave
//! within one process.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use souk_domain::{
    insert_reply, remove_comment, Ad, AdStatus, AdminConfig, Category, Comment, DomainError,
    ModerationItem, NewAd, Report, Review, Tier, User, UserStatus,
};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{AccountRepository, CatalogRepository, Clock, PreferenceRepository};
use crate::session::{LogoutReason, SessionManager};

/// Loading state of the snapshot.
///
/// Consumers never observe a partially populated snapshot: the batch load
/// either succeeds as a whole (`Ready`) or the store stays in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// `load` has not been called yet.
    #[default]
    Idle,
    /// The batch load is in flight.
    Loading,
    /// All fetches succeeded; the snapshot is trustworthy.
    Ready,
    /// At least one fetch failed; the snapshot is empty.
    Failed {
        /// Reason code of the failed fetch.
        reason: String,
    },
}

#[derive(Debug, Default)]
struct Snapshot {
    ads: Vec<Ad>,
    users: Vec<User>,
    categories: Vec<Category>,
    tiers: Vec<Tier>,
    config: AdminConfig,
}

#[derive(Debug, Default)]
struct CatalogState {
    load: LoadState,
    snapshot: Snapshot,
}

/// Result of a like toggle.
#[derive(Debug, Clone, PartialEq)]
pub struct LikeOutcome {
    /// The updated ad.
    pub ad: Ad,
    /// Whether the user likes the ad after the toggle.
    pub liked: bool,
}

/// The synchronized marketplace snapshot and its mutation protocol.
#[derive(Debug)]
pub struct CatalogStore<R, A, P, C> {
    catalog: Arc<R>,
    accounts: Arc<A>,
    prefs: Arc<P>,
    clock: Arc<C>,
    state: Arc<RwLock<CatalogState>>,
}

impl<R, A, P, C> Clone for CatalogStore<R, A, P, C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            accounts: Arc::clone(&self.accounts),
            prefs: Arc::clone(&self.prefs),
            clock: Arc::clone(&self.clock),
            state: Arc::clone(&self.state),
        }
    }
}

impl<R, A, P, C> CatalogStore<R, A, P, C>
where
    R: CatalogRepository,
    A: AccountRepository,
    P: PreferenceRepository,
    C: Clock,
{
    /// Creates an empty, not-yet-loaded store.
    #[must_use]
    pub fn new(catalog: Arc<R>, accounts: Arc<A>, prefs: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            catalog,
            accounts,
            prefs,
            clock,
            state: Arc::new(RwLock::new(CatalogState::default())),
        }
    }

    /// Loads the snapshot via five independent fetches with join
    /// semantics: any single failure aborts the whole load and the store
    /// reports `Failed` rather than a partial snapshot.
    ///
    /// # Errors
    ///
    /// Propagates the first fetch failure.
    pub async fn load(&self) -> ApplicationResult<()> {
        {
            let mut state = self.state.write().await;
            state.load = LoadState::Loading;
        }

        let fetched = tokio::try_join!(
            self.catalog.list_ads(),
            self.accounts.list_users(),
            self.catalog.list_categories(),
            self.catalog.list_tiers(),
            self.catalog.get_config(),
        );

        let mut state = self.state.write().await;
        match fetched {
            Ok((ads, users, categories, tiers, config)) => {
                info!(
                    ads = ads.len(),
                    users = users.len(),
                    categories = categories.len(),
                    "catalog snapshot loaded"
                );
                state.snapshot = Snapshot {
                    ads,
                    users,
                    categories,
                    tiers,
                    config,
                };
                state.load = LoadState::Ready;
                Ok(())
            }
            Err(err) => {
                warn!(reason = err.reason_code(), "catalog load failed");
                state.snapshot = Snapshot::default();
                state.load = LoadState::Failed {
                    reason: err.reason_code().to_string(),
                };
                Err(err)
            }
        }
    }

    /// Current loading state.
    pub async fn load_state(&self) -> LoadState {
        self.state.read().await.load.clone()
    }

    // ---- Ad lifecycle ---------------------------------------------------

    /// Creates a listing, snapshotting the seller by value, and installs
    /// it at the head of the ad list.
    ///
    /// # Errors
    ///
    /// Domain validation errors for a bad draft; collaborator failures
    /// propagate.
    pub async fn create_ad(&self, seller: &User, draft: NewAd) -> ApplicationResult<Ad> {
        draft.validate()?;
        let mut state = self.state.write().await;
        let ad = self.catalog.create_ad(draft, seller).await?;
        debug!(ad_id = %ad.id, seller_id = %ad.seller.id, "ad created");
        state.snapshot.ads.insert(0, ad.clone());
        Ok(ad)
    }

    /// Persists a full ad update and replaces the cached copy.
    ///
    /// # Errors
    ///
    /// `NotFound` when the ad does not exist.
    pub async fn update_ad(&self, ad: Ad) -> ApplicationResult<Ad> {
        let mut state = self.state.write().await;
        let saved = self.catalog.update_ad(&ad).await?;
        Self::install_ad(&mut state.snapshot, saved.clone());
        Ok(saved)
    }

    /// Bumps the view counter.
    ///
    /// # Errors
    ///
    /// `NotFound` when the ad is not in the snapshot.
    pub async fn record_view(&self, ad_id: &str) -> ApplicationResult<Ad> {
        let mut state = self.state.write().await;
        let mut ad = Self::ad_in(&state.snapshot, ad_id)?;
        ad.stats.views += 1;
        let saved = self.catalog.update_ad(&ad).await?;
        Self::install_ad(&mut state.snapshot, saved.clone());
        Ok(saved)
    }

    /// Toggles the user's like on an ad.
    ///
    /// Idempotent per user: the aggregate counter and the locally
    /// persisted liked-set flip together, so toggling twice restores both
    /// the counter and the membership. On any failure neither flip
    /// survives: the membership is flipped first and compensated when the
    /// counter write fails.
    ///
    /// # Errors
    ///
    /// `NotFound` when the ad is not in the snapshot; preference or
    /// collaborator failures propagate.
    pub async fn toggle_like(&self, user_id: &str, ad_id: &str) -> ApplicationResult<LikeOutcome> {
        let mut state = self.state.write().await;
        let liked_now = self.prefs.liked_ads(user_id).await?.contains(ad_id);

        let mut ad = Self::ad_in(&state.snapshot, ad_id)?;
        ad.stats.likes += if liked_now { -1 } else { 1 };

        self.prefs.set_liked(user_id, ad_id, !liked_now).await?;
        let saved = match self.catalog.update_ad(&ad).await {
            Ok(saved) => saved,
            Err(err) => {
                if let Err(undo) = self.prefs.set_liked(user_id, ad_id, liked_now).await {
                    warn!(reason = undo.reason_code(), "liked-set compensation failed");
                }
                return Err(err);
            }
        };
        Self::install_ad(&mut state.snapshot, saved.clone());

        Ok(LikeOutcome {
            ad: saved,
            liked: !liked_now,
        })
    }

    // ---- Comments -------------------------------------------------------

    /// Adds a top-level comment.
    ///
    /// # Errors
    ///
    /// Domain error for empty text, `NotFound` for a missing ad.
    pub async fn add_comment(
        &self,
        ad_id: &str,
        author: &User,
        text: &str,
    ) -> ApplicationResult<Ad> {
        let comment = self.build_comment(author, text)?;
        let mut state = self.state.write().await;
        let mut ad = Self::ad_in(&state.snapshot, ad_id)?;
        ad.comments.push(comment);
        let saved = self.catalog.update_ad(&ad).await?;
        Self::install_ad(&mut state.snapshot, saved.clone());
        Ok(saved)
    }

    /// Adds a reply under the first comment matching `parent_id`,
    /// searching depth-first from the top-level comments.
    ///
    /// # Errors
    ///
    /// `NotFound` when the ad or the parent comment is missing.
    pub async fn add_reply(
        &self,
        ad_id: &str,
        parent_id: &str,
        author: &User,
        text: &str,
    ) -> ApplicationResult<Ad> {
        let reply = self.build_comment(author, text)?;
        let mut state = self.state.write().await;
        let mut ad = Self::ad_in(&state.snapshot, ad_id)?;
        if !insert_reply(&mut ad.comments, parent_id, reply) {
            return Err(ApplicationError::NotFound("comment".to_string()));
        }
        let saved = self.catalog.update_ad(&ad).await?;
        Self::install_ad(&mut state.snapshot, saved.clone());
        Ok(saved)
    }

    /// Deletes a comment at any depth, rebuilding the tree and preserving
    /// the remaining structure.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing ad; a missing comment id is a no-op.
    pub async fn delete_comment(&self, ad_id: &str, comment_id: &str) -> ApplicationResult<Ad> {
        let mut state = self.state.write().await;
        let mut ad = Self::ad_in(&state.snapshot, ad_id)?;
        ad.comments = remove_comment(std::mem::take(&mut ad.comments), comment_id);
        let saved = self.catalog.update_ad(&ad).await?;
        Self::install_ad(&mut state.snapshot, saved.clone());
        Ok(saved)
    }

    // ---- Reviews --------------------------------------------------------

    /// Appends a review, recomputes the ad's mean rating, then fans out to
    /// the seller: the seller's global rating and review count are
    /// recomputed from the full review set of *all* that seller's ads, not
    /// updated incrementally, so repeated submissions cannot drift.
    ///
    /// # Errors
    ///
    /// Domain errors for an out-of-scale rating or empty text, `NotFound`
    /// for a missing ad.
    pub async fn add_review(
        &self,
        ad_id: &str,
        reviewer: &User,
        submitted_rating: u8,
        text: &str,
    ) -> ApplicationResult<Ad> {
        let now = self.clock.now();
        let review = Review::from_submission(
            reviewer.id.clone(),
            reviewer.name.clone(),
            submitted_rating,
            text,
            now,
        )?;

        let mut state = self.state.write().await;
        let mut ad = Self::ad_in(&state.snapshot, ad_id)?;
        ad.reviews.push(review);
        ad.recompute_rating();
        ad.updated_at = now;
        let saved = self.catalog.update_ad(&ad).await?;
        let seller_id = saved.seller.id.clone();
        Self::install_ad(&mut state.snapshot, saved.clone());

        // Fan-out: full recompute across every ad owned by the seller.
        let (sum, count) = state
            .snapshot
            .ads
            .iter()
            .filter(|a| a.seller.id == seller_id)
            .flat_map(|a| a.reviews.iter())
            .fold((0.0_f64, 0_usize), |(sum, count), r| {
                (sum + r.rating, count + 1)
            });

        // The seller may have registered after the snapshot was loaded;
        // the collaborator is the source of truth in that case.
        let seller = match Self::user_in(&state.snapshot, &seller_id) {
            Some(user) => Some(user),
            None => self.accounts.get_current_user(&seller_id).await?,
        };
        if let Some(mut seller) = seller {
            #[allow(clippy::cast_precision_loss)]
            let rating = if count == 0 { 0.0 } else { sum / count as f64 };
            seller.reputation.rating = rating;
            seller.reputation.review_count = count;
            let saved_seller = self.accounts.update_user(&seller).await?;
            Self::install_user(&mut state.snapshot, saved_seller);
        }

        debug!(ad_id = %saved.id, rating = saved.rating, "review recorded");
        Ok(saved)
    }

    // ---- Moderation -----------------------------------------------------

    /// Files a report against an active ad.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing ad; `Generic` when the ad is banned
    /// (banned is terminal and accumulates no further reports).
    pub async fn report_ad(
        &self,
        ad_id: &str,
        reporter_id: &str,
        reason: &str,
    ) -> ApplicationResult<Ad> {
        let mut state = self.state.write().await;
        let mut ad = Self::ad_in(&state.snapshot, ad_id)?;
        if !ad.status.is_active() {
            return Err(ApplicationError::Generic(
                "cannot report an inactive ad".to_string(),
            ));
        }
        ad.reports.push(Report {
            reporter_id: reporter_id.to_string(),
            reason: reason.to_string(),
            created_at: self.clock.now(),
        });
        let saved = self.catalog.update_ad(&ad).await?;
        Self::install_ad(&mut state.snapshot, saved.clone());
        Ok(saved)
    }

    /// The moderation queue: active ads with open reports, recomputed from
    /// scratch on every access.
    pub async fn moderation_queue(&self) -> Vec<ModerationItem> {
        let state = self.state.read().await;
        state
            .snapshot
            .ads
            .iter()
            .filter_map(ModerationItem::from_ad)
            .collect()
    }

    /// Approves a reported ad, clearing its report list.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing ad.
    pub async fn approve_ad(&self, ad_id: &str) -> ApplicationResult<Ad> {
        let mut state = self.state.write().await;
        let mut ad = Self::ad_in(&state.snapshot, ad_id)?;
        ad.reports.clear();
        let saved = self.catalog.update_ad(&ad).await?;
        info!(ad_id = %saved.id, "ad approved, reports cleared");
        Self::install_ad(&mut state.snapshot, saved.clone());
        Ok(saved)
    }

    /// Removes a reported ad: status becomes banned with the given reason.
    /// Terminal: a banned ad accumulates no further reports.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing ad.
    pub async fn remove_ad(&self, ad_id: &str, reason: &str) -> ApplicationResult<Ad> {
        let mut state = self.state.write().await;
        let mut ad = Self::ad_in(&state.snapshot, ad_id)?;
        ad.status = AdStatus::Banned {
            reason: reason.to_string(),
        };
        let saved = self.catalog.update_ad(&ad).await?;
        info!(ad_id = %saved.id, reason, "ad removed by moderation");
        Self::install_ad(&mut state.snapshot, saved.clone());
        Ok(saved)
    }

    /// Bans a user. When the banned account is the one currently signed in
    /// on `session`, the session is logged out immediately with a
    /// suspension reason.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing user.
    pub async fn ban_user<SA, SC>(
        &self,
        user_id: &str,
        reason: &str,
        session: &SessionManager<SA, SC>,
    ) -> ApplicationResult<User>
    where
        SA: AccountRepository,
        SC: Clock,
    {
        let saved = {
            let mut state = self.state.write().await;
            let mut user = Self::user_in(&state.snapshot, user_id)
                .ok_or_else(|| ApplicationError::NotFound("user".to_string()))?;
            user.status = UserStatus::Banned {
                reason: reason.to_string(),
            };
            let saved = self.accounts.update_user(&user).await?;
            Self::install_user(&mut state.snapshot, saved.clone());
            saved
        };
        info!(user_id = %saved.id, reason, "user banned");

        if session.current_user_id().await.as_deref() == Some(user_id) {
            warn!(user_id, "banned the signed-in account, forcing logout");
            session.logout(Some(LogoutReason::AccountSuspended)).await;
        }
        Ok(saved)
    }

    /// Lifts a user's ban.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing user.
    pub async fn unban_user(&self, user_id: &str) -> ApplicationResult<User> {
        let mut state = self.state.write().await;
        let mut user = Self::user_in(&state.snapshot, user_id)
            .ok_or_else(|| ApplicationError::NotFound("user".to_string()))?;
        user.status = UserStatus::Active;
        let saved = self.accounts.update_user(&user).await?;
        Self::install_user(&mut state.snapshot, saved.clone());
        Ok(saved)
    }

    /// Moves a user to another tier.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing user or an unknown tier name.
    pub async fn set_user_tier(&self, user_id: &str, tier: &str) -> ApplicationResult<User> {
        let mut state = self.state.write().await;
        if !state.snapshot.tiers.iter().any(|t| t.name == tier) {
            return Err(ApplicationError::NotFound("tier".to_string()));
        }
        let mut user = Self::user_in(&state.snapshot, user_id)
            .ok_or_else(|| ApplicationError::NotFound("user".to_string()))?;
        user.tier = tier.to_string();
        let saved = self.accounts.update_user(&user).await?;
        Self::install_user(&mut state.snapshot, saved.clone());
        Ok(saved)
    }

    // ---- Categories, tiers, config --------------------------------------

    /// Adds a category by name.
    ///
    /// # Errors
    ///
    /// Domain error for an empty name; collaborator failures propagate.
    pub async fn add_category(&self, name: &str) -> ApplicationResult<Category> {
        if name.trim().is_empty() {
            return Err(DomainError::EmptyField("category name").into());
        }
        let mut state = self.state.write().await;
        let category = self.catalog.add_category(name).await?;
        state.snapshot.categories.push(category.clone());
        Ok(category)
    }

    /// Removes a category.
    ///
    /// # Errors
    ///
    /// `NotFound` when no category has the given id.
    pub async fn remove_category(&self, id: &str) -> ApplicationResult<()> {
        let mut state = self.state.write().await;
        self.catalog.remove_category(id).await?;
        state.snapshot.categories.retain(|c| c.id != id);
        Ok(())
    }

    /// Replaces the tier table.
    ///
    /// # Errors
    ///
    /// Collaborator failures propagate.
    pub async fn update_tiers(&self, tiers: Vec<Tier>) -> ApplicationResult<Vec<Tier>> {
        let mut state = self.state.write().await;
        let saved = self.catalog.update_tiers(tiers).await?;
        state.snapshot.tiers = saved.clone();
        Ok(saved)
    }

    /// Replaces the site configuration.
    ///
    /// # Errors
    ///
    /// Collaborator failures propagate.
    pub async fn update_config(&self, config: AdminConfig) -> ApplicationResult<AdminConfig> {
        let mut state = self.state.write().await;
        let saved = self.catalog.update_config(&config).await?;
        state.snapshot.config = saved.clone();
        Ok(saved)
    }

    // ---- Derived views --------------------------------------------------

    /// All ads, newest first.
    pub async fn ads(&self) -> Vec<Ad> {
        self.state.read().await.snapshot.ads.clone()
    }

    /// One ad by id, or `None`.
    pub async fn ad(&self, ad_id: &str) -> Option<Ad> {
        Self::ad_in(&self.state.read().await.snapshot, ad_id).ok()
    }

    /// All ads listed by one seller; empty when the seller is unknown.
    pub async fn ads_by_seller(&self, seller_id: &str) -> Vec<Ad> {
        self.state
            .read()
            .await
            .snapshot
            .ads
            .iter()
            .filter(|a| a.seller.id == seller_id)
            .cloned()
            .collect()
    }

    /// All users.
    pub async fn users(&self) -> Vec<User> {
        self.state.read().await.snapshot.users.clone()
    }

    /// One user by id, or `None`.
    pub async fn user(&self, user_id: &str) -> Option<User> {
        Self::user_in(&self.state.read().await.snapshot, user_id)
    }

    /// All categories.
    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.snapshot.categories.clone()
    }

    /// The tier table.
    pub async fn tiers(&self) -> Vec<Tier> {
        self.state.read().await.snapshot.tiers.clone()
    }

    /// The site configuration.
    pub async fn config(&self) -> AdminConfig {
        self.state.read().await.snapshot.config.clone()
    }

    // ---- Internals ------------------------------------------------------

    fn build_comment(&self, author: &User, text: &str) -> ApplicationResult<Comment> {
        if text.trim().is_empty() {
            return Err(DomainError::EmptyField("comment text").into());
        }
        Ok(Comment::new(
            author.id.clone(),
            author.name.clone(),
            text,
            self.clock.now(),
        ))
    }

    fn ad_in(snapshot: &Snapshot, ad_id: &str) -> ApplicationResult<Ad> {
        snapshot
            .ads
            .iter()
            .find(|a| a.id == ad_id)
            .cloned()
            .ok_or_else(|| ApplicationError::NotFound("ad".to_string()))
    }

    fn user_in(snapshot: &Snapshot, user_id: &str) -> Option<User> {
        snapshot.users.iter().find(|u| u.id == user_id).cloned()
    }

    fn install_ad(snapshot: &mut Snapshot, ad: Ad) {
        if let Some(slot) = snapshot.ads.iter_mut().find(|a| a.id == ad.id) {
            *slot = ad;
        } else {
            snapshot.ads.insert(0, ad);
        }
    }

    fn install_user(snapshot: &mut Snapshot, user: User) {
        if let Some(slot) = snapshot.users.iter_mut().find(|u| u.id == user.id) {
            *slot = user;
        } else {
            snapshot.users.push(user);
        }
    }
}
