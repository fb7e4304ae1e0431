//! JSON-file-backed collaborator.
//!
//! Wraps [`MemoryStore`] and rewrites the whole dataset to one JSON
//! document after every mutation. This is the pluggable replacement for
//! the original browser-local-storage mock: same contract, explicit file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use souk_application::ports::{AccountRepository, CatalogRepository, PreferenceRepository};
use souk_application::{ApplicationError, ApplicationResult};
use souk_domain::{Ad, AdminConfig, Category, NewAd, NewUser, Tier, User};

use crate::serialization::{from_json, to_json_stable};

use super::{Dataset, MemoryStore};

/// Collaborator persisted to a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Opens a store at `path`, loading the existing dataset when the file
    /// is present and starting from defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the file exists but cannot be read or
    /// parsed.
    pub async fn open(path: impl Into<PathBuf>) -> ApplicationResult<Self> {
        let path = path.into();
        let dataset = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => from_json(&contents)
                .map_err(|e| ApplicationError::Storage(e.to_string()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Dataset::default(),
            Err(err) => return Err(ApplicationError::Storage(err.to_string())),
        };
        debug!(path = %path.display(), "file store opened");
        Ok(Self {
            path,
            inner: MemoryStore::with_dataset(dataset),
        })
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> ApplicationResult<()> {
        let dataset = self.inner.dataset().await;
        let json =
            to_json_stable(&dataset).map_err(|e| ApplicationError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| ApplicationError::Storage(e.to_string()))
    }
}

impl AccountRepository for JsonFileStore {
    async fn login(&self, email: &str, password: &str) -> ApplicationResult<User> {
        self.inner.login(email, password).await
    }

    async fn verify_two_factor(&self, user_id: &str, code: &str) -> ApplicationResult<User> {
        self.inner.verify_two_factor(user_id, code).await
    }

    async fn register(&self, new_user: NewUser) -> ApplicationResult<User> {
        let user = self.inner.register(new_user).await?;
        self.persist().await?;
        Ok(user)
    }

    async fn provider_login(&self, provider: &str, subject: &str) -> ApplicationResult<User> {
        let user = self.inner.provider_login(provider, subject).await?;
        // Provider login may have provisioned a fresh account.
        self.persist().await?;
        Ok(user)
    }

    async fn phone_login(&self, phone: &str, code: &str) -> ApplicationResult<User> {
        self.inner.phone_login(phone, code).await
    }

    async fn logout(&self, user_id: &str) -> ApplicationResult<()> {
        self.inner.logout(user_id).await
    }

    async fn get_current_user(&self, user_id: &str) -> ApplicationResult<Option<User>> {
        self.inner.get_current_user(user_id).await
    }

    async fn update_user(&self, user: &User) -> ApplicationResult<User> {
        let saved = self.inner.update_user(user).await?;
        self.persist().await?;
        Ok(saved)
    }

    async fn list_users(&self) -> ApplicationResult<Vec<User>> {
        self.inner.list_users().await
    }
}

impl CatalogRepository for JsonFileStore {
    async fn list_ads(&self) -> ApplicationResult<Vec<Ad>> {
        self.inner.list_ads().await
    }

    async fn create_ad(&self, draft: NewAd, seller: &User) -> ApplicationResult<Ad> {
        let ad = self.inner.create_ad(draft, seller).await?;
        self.persist().await?;
        Ok(ad)
    }

    async fn update_ad(&self, ad: &Ad) -> ApplicationResult<Ad> {
        let saved = self.inner.update_ad(ad).await?;
        self.persist().await?;
        Ok(saved)
    }

    async fn list_categories(&self) -> ApplicationResult<Vec<Category>> {
        self.inner.list_categories().await
    }

    async fn add_category(&self, name: &str) -> ApplicationResult<Category> {
        let category = self.inner.add_category(name).await?;
        self.persist().await?;
        Ok(category)
    }

    async fn remove_category(&self, id: &str) -> ApplicationResult<()> {
        self.inner.remove_category(id).await?;
        self.persist().await
    }

    async fn list_tiers(&self) -> ApplicationResult<Vec<Tier>> {
        self.inner.list_tiers().await
    }

    async fn update_tiers(&self, tiers: Vec<Tier>) -> ApplicationResult<Vec<Tier>> {
        let saved = self.inner.update_tiers(tiers).await?;
        self.persist().await?;
        Ok(saved)
    }

    async fn get_config(&self) -> ApplicationResult<AdminConfig> {
        self.inner.get_config().await
    }

    async fn update_config(&self, config: &AdminConfig) -> ApplicationResult<AdminConfig> {
        let saved = self.inner.update_config(config).await?;
        self.persist().await?;
        Ok(saved)
    }
}

impl PreferenceRepository for JsonFileStore {
    async fn liked_ads(&self, user_id: &str) -> ApplicationResult<HashSet<String>> {
        self.inner.liked_ads(user_id).await
    }

    async fn set_liked(&self, user_id: &str, ad_id: &str, liked: bool) -> ApplicationResult<()> {
        self.inner.set_liked(user_id, ad_id, liked).await?;
        self.persist().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn registration(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "Someone".to_string(),
            password: "pw".to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_dataset_survives_reopen() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("souk.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        let user = store.register(registration("a@x.com")).await.unwrap();
        store
            .create_ad(
                NewAd {
                    title: "Desk".to_string(),
                    description: String::new(),
                    price: 40.0,
                    category_id: "c".to_string(),
                },
                &user,
            )
            .await
            .unwrap();
        assert!(path.exists());

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let users = reopened.list_users().await.unwrap();
        let ads = reopened.list_ads().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(ads.len(), 1);
        assert_eq!(ads[0].seller.id, users[0].id);

        // Credentials travel with the file.
        assert!(reopened.login("a@x.com", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("souk.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert_eq!(err.reason_code(), "storage_failure");
    }
}
