//! Catalog collaborator port

use std::future::Future;

use souk_domain::{Ad, AdminConfig, Category, NewAd, Tier, User};

use crate::ApplicationResult;

/// Port for catalog persistence: ads, categories, tiers, site config.
///
/// Writes return the full updated entity, never a diff.
pub trait CatalogRepository: Send + Sync {
    /// Lists all ads, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn list_ads(&self) -> impl Future<Output = ApplicationResult<Vec<Ad>>> + Send;

    /// Creates an ad from a draft, snapshotting the seller by value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn create_ad(
        &self,
        draft: NewAd,
        seller: &User,
    ) -> impl Future<Output = ApplicationResult<Ad>> + Send;

    /// Persists a full ad record and returns the stored entity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the ad does not exist.
    fn update_ad(&self, ad: &Ad) -> impl Future<Output = ApplicationResult<Ad>> + Send;

    /// Lists all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn list_categories(&self) -> impl Future<Output = ApplicationResult<Vec<Category>>> + Send;

    /// Adds a category by name and returns the stored entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn add_category(&self, name: &str) -> impl Future<Output = ApplicationResult<Category>> + Send;

    /// Removes a category.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no category has the given id.
    fn remove_category(&self, id: &str) -> impl Future<Output = ApplicationResult<()>> + Send;

    /// Lists the tier table.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn list_tiers(&self) -> impl Future<Output = ApplicationResult<Vec<Tier>>> + Send;

    /// Replaces the tier table and returns the stored set.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn update_tiers(
        &self,
        tiers: Vec<Tier>,
    ) -> impl Future<Output = ApplicationResult<Vec<Tier>>> + Send;

    /// Reads the site configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get_config(&self) -> impl Future<Output = ApplicationResult<AdminConfig>> + Send;

    /// Replaces the site configuration and returns the stored value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn update_config(
        &self,
        config: &AdminConfig,
    ) -> impl Future<Output = ApplicationResult<AdminConfig>> + Send;
}
