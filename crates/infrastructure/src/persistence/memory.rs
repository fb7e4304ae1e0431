//! In-memory collaborator.
//!
//! [`MemoryStore`] implements all three repository ports against a single
//! locked dataset. It is the mock backend: credential checks are plaintext
//! equality over a map held beside the user entities, which is a mock
//! boundary, not a security layer.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use souk_application::ports::{AccountRepository, CatalogRepository, PreferenceRepository};
use souk_application::{ApplicationError, ApplicationResult};
use souk_domain::{
    generate_id, Ad, AdminConfig, Category, CloudSync, NewAd, NewUser, Reputation, Tier, User,
    UserStatus,
};

/// The full persisted dataset. Serializable so [`super::JsonFileStore`]
/// can write it to disk wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// All user accounts.
    pub users: Vec<User>,
    /// Plaintext credentials, keyed by email. Mock only.
    pub credentials: HashMap<String, String>,
    /// External identity links, `"provider:subject"` to user id.
    pub provider_identities: HashMap<String, String>,
    /// One-time phone login codes, keyed by phone number.
    pub phone_codes: HashMap<String, String>,
    /// All ads, newest first.
    pub ads: Vec<Ad>,
    /// All categories.
    pub categories: Vec<Category>,
    /// The tier table.
    pub tiers: Vec<Tier>,
    /// Site configuration.
    pub config: AdminConfig,
    /// Per-user liked ad ids.
    pub liked: HashMap<String, HashSet<String>>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            credentials: HashMap::new(),
            provider_identities: HashMap::new(),
            phone_codes: HashMap::new(),
            ads: Vec::new(),
            categories: Vec::new(),
            tiers: Tier::defaults(),
            config: AdminConfig::default(),
            liked: HashMap::new(),
        }
    }
}

impl Dataset {
    /// Seeds an account with its password.
    pub fn add_user(&mut self, user: User, password: impl Into<String>) {
        self.credentials.insert(user.email.clone(), password.into());
        self.users.push(user);
    }

    /// Seeds a one-time phone login code.
    pub fn add_phone_code(&mut self, phone: impl Into<String>, code: impl Into<String>) {
        self.phone_codes.insert(phone.into(), code.into());
    }
}

/// In-memory implementation of the collaborator contract.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Dataset>>,
}

impl MemoryStore {
    /// Creates an empty store with default tiers and config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store over an existing dataset.
    #[must_use]
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            data: Arc::new(RwLock::new(dataset)),
        }
    }

    /// Snapshot of the full dataset, e.g. for persisting to disk.
    pub async fn dataset(&self) -> Dataset {
        self.data.read().await.clone()
    }

    fn user_by_id(dataset: &Dataset, user_id: &str) -> Option<User> {
        dataset.users.iter().find(|u| u.id == user_id).cloned()
    }
}

impl AccountRepository for MemoryStore {
    async fn login(&self, email: &str, password: &str) -> ApplicationResult<User> {
        let data = self.data.read().await;
        let matches = data
            .credentials
            .get(email)
            .is_some_and(|stored| stored == password);
        if !matches {
            return Err(ApplicationError::InvalidCredentials);
        }
        data.users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(ApplicationError::InvalidCredentials)
    }

    async fn verify_two_factor(&self, user_id: &str, code: &str) -> ApplicationResult<User> {
        let data = self.data.read().await;
        let user = Self::user_by_id(&data, user_id)
            .ok_or_else(|| ApplicationError::NotFound("user".to_string()))?;
        if user.two_factor_secret.as_deref() == Some(code) {
            Ok(user)
        } else {
            Err(ApplicationError::InvalidCode)
        }
    }

    async fn register(&self, new_user: NewUser) -> ApplicationResult<User> {
        let mut data = self.data.write().await;
        if data.users.iter().any(|u| u.email == new_user.email) {
            return Err(ApplicationError::UserExists);
        }
        let password = new_user.password.clone();
        let user = new_user.into_user(Tier::DEFAULT_NAME, Utc::now());
        data.add_user(user.clone(), password);
        Ok(user)
    }

    async fn provider_login(&self, provider: &str, subject: &str) -> ApplicationResult<User> {
        let key = format!("{provider}:{subject}");
        let mut data = self.data.write().await;

        if let Some(user_id) = data.provider_identities.get(&key).cloned() {
            return Self::user_by_id(&data, &user_id)
                .ok_or_else(|| ApplicationError::NotFound("user".to_string()));
        }

        // First sign-in through this identity: provision a fresh account.
        let user = User {
            id: generate_id(),
            email: format!("{subject}@{provider}.id"),
            name: subject.to_string(),
            tier: Tier::DEFAULT_NAME.to_string(),
            status: UserStatus::Active,
            reputation: Reputation::default(),
            two_factor_secret: None,
            phone: None,
            cloud_sync: CloudSync::default(),
            created_at: Utc::now(),
        };
        data.provider_identities.insert(key, user.id.clone());
        data.users.push(user.clone());
        Ok(user)
    }

    async fn phone_login(&self, phone: &str, code: &str) -> ApplicationResult<User> {
        let data = self.data.read().await;
        let user = data
            .users
            .iter()
            .find(|u| u.phone.as_deref() == Some(phone))
            .cloned()
            .ok_or_else(|| ApplicationError::NotFound("user".to_string()))?;
        let matches = data
            .phone_codes
            .get(phone)
            .is_some_and(|stored| stored == code);
        if matches {
            Ok(user)
        } else {
            Err(ApplicationError::InvalidCode)
        }
    }

    async fn logout(&self, _user_id: &str) -> ApplicationResult<()> {
        // The mock backend has no server-side session to invalidate.
        Ok(())
    }

    async fn get_current_user(&self, user_id: &str) -> ApplicationResult<Option<User>> {
        let data = self.data.read().await;
        Ok(Self::user_by_id(&data, user_id))
    }

    async fn update_user(&self, user: &User) -> ApplicationResult<User> {
        let mut data = self.data.write().await;
        let slot = data
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| ApplicationError::NotFound("user".to_string()))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn list_users(&self) -> ApplicationResult<Vec<User>> {
        Ok(self.data.read().await.users.clone())
    }
}

impl CatalogRepository for MemoryStore {
    async fn list_ads(&self) -> ApplicationResult<Vec<Ad>> {
        Ok(self.data.read().await.ads.clone())
    }

    async fn create_ad(&self, draft: NewAd, seller: &User) -> ApplicationResult<Ad> {
        let ad = draft.into_ad(seller, Utc::now());
        let mut data = self.data.write().await;
        data.ads.insert(0, ad.clone());
        Ok(ad)
    }

    async fn update_ad(&self, ad: &Ad) -> ApplicationResult<Ad> {
        let mut data = self.data.write().await;
        let slot = data
            .ads
            .iter_mut()
            .find(|a| a.id == ad.id)
            .ok_or_else(|| ApplicationError::NotFound("ad".to_string()))?;
        let mut updated = ad.clone();
        updated.updated_at = Utc::now();
        *slot = updated.clone();
        Ok(updated)
    }

    async fn list_categories(&self) -> ApplicationResult<Vec<Category>> {
        Ok(self.data.read().await.categories.clone())
    }

    async fn add_category(&self, name: &str) -> ApplicationResult<Category> {
        let category = Category::new(name);
        let mut data = self.data.write().await;
        data.categories.push(category.clone());
        Ok(category)
    }

    async fn remove_category(&self, id: &str) -> ApplicationResult<()> {
        let mut data = self.data.write().await;
        let before = data.categories.len();
        data.categories.retain(|c| c.id != id);
        if data.categories.len() == before {
            return Err(ApplicationError::NotFound("category".to_string()));
        }
        Ok(())
    }

    async fn list_tiers(&self) -> ApplicationResult<Vec<Tier>> {
        Ok(self.data.read().await.tiers.clone())
    }

    async fn update_tiers(&self, tiers: Vec<Tier>) -> ApplicationResult<Vec<Tier>> {
        let mut data = self.data.write().await;
        data.tiers = tiers.clone();
        Ok(tiers)
    }

    async fn get_config(&self) -> ApplicationResult<AdminConfig> {
        Ok(self.data.read().await.config.clone())
    }

    async fn update_config(&self, config: &AdminConfig) -> ApplicationResult<AdminConfig> {
        let mut data = self.data.write().await;
        data.config = config.clone();
        Ok(config.clone())
    }
}

impl PreferenceRepository for MemoryStore {
    async fn liked_ads(&self, user_id: &str) -> ApplicationResult<HashSet<String>> {
        Ok(self
            .data
            .read()
            .await
            .liked
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_liked(&self, user_id: &str, ad_id: &str, liked: bool) -> ApplicationResult<()> {
        let mut data = self.data.write().await;
        let set = data.liked.entry(user_id.to_string()).or_default();
        if liked {
            set.insert(ad_id.to_string());
        } else {
            set.remove(ad_id);
        }
        Ok(())
    }
}
