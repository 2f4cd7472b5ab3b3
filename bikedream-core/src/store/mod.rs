//! Persistent record access.
//!
//! The [`Store`] owns one lock-free collection per entity plus the derived
//! unique indexes (case-folded email, favorite pair key). All writes are
//! atomic per document; cross-document consistency is the callers'
//! responsibility, structured so a partial failure is detectable by a
//! subsequent read.

mod collection;
mod snapshot;

pub use collection::Collection;

use std::sync::Arc;

use scc::HashMap as SccHashMap;

use crate::model::{
    Achievement, AnalyticsEvent, Banner, Comment, Favorite, GarageItem, Motorcycle, Rating,
    RiderGroup, Session, UpdateJob, User, UserAchievement, UserCounters, UserRequest,
};

/// Store-level errors.
#[derive(thiserror::Error, Debug, Clone)]
pub enum StoreError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: &'static str, id: String },
    #[error("duplicate key {id} in {collection}")]
    Conflict { collection: &'static str, id: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// All collections of the catalog-and-community service.
pub struct Store {
    pub motorcycles: Collection<Motorcycle>,
    pub users: Collection<User>,
    pub sessions: Collection<Session>,
    pub favorites: Collection<Favorite>,
    pub ratings: Collection<Rating>,
    pub comments: Collection<Comment>,
    pub banners: Collection<Banner>,
    pub garage: Collection<GarageItem>,
    pub groups: Collection<RiderGroup>,
    pub achievements: Collection<Achievement>,
    pub user_achievements: Collection<UserAchievement>,
    pub counters: Collection<UserCounters>,
    pub requests: Collection<UserRequest>,
    pub jobs: Collection<UpdateJob>,
    pub analytics: Collection<AnalyticsEvent>,
    /// Case-folded email -> user id.
    email_index: Arc<SccHashMap<String, String>>,
}

impl Store {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            motorcycles: Collection::new("motorcycles"),
            users: Collection::new("users"),
            sessions: Collection::new("sessions"),
            favorites: Collection::new("favorites"),
            ratings: Collection::new("ratings"),
            comments: Collection::new("comments"),
            banners: Collection::new("banners"),
            garage: Collection::new("garage"),
            groups: Collection::new("groups"),
            achievements: Collection::new("achievements"),
            user_achievements: Collection::new("user_achievements"),
            counters: Collection::new("counters"),
            requests: Collection::new("requests"),
            jobs: Collection::new("jobs"),
            analytics: Collection::new("analytics"),
            email_index: Arc::new(SccHashMap::new()),
        })
    }

    /// Create a user, enforcing case-insensitive email uniqueness. The
    /// index entry is claimed first so two concurrent registrations for
    /// the same address cannot both succeed.
    pub async fn create_user(&self, user: User) -> Result<(), StoreError> {
        let email_key = user.email.trim().to_lowercase();
        if self.email_index.insert_async(email_key.clone(), user.id.clone()).await.is_err() {
            let holder = self
                .email_index
                .read_async(&email_key, |_, id| id.clone())
                .await
                .unwrap_or_default();
            return Err(StoreError::Conflict { collection: "users", id: holder });
        }
        if let Err(e) = self.users.insert(user.id.clone(), user).await {
            self.email_index.remove_async(&email_key).await;
            return Err(e);
        }
        Ok(())
    }

    /// Look up a user by email, case-insensitively.
    pub async fn user_by_email(&self, email: &str) -> Option<User> {
        let email_key = email.trim().to_lowercase();
        let id = self.email_index.read_async(&email_key, |_, id| id.clone()).await?;
        self.users.get(&id).await
    }

    /// Rebuild the email index from the users collection. Called after a
    /// snapshot load.
    pub(crate) async fn rebuild_email_index(&self) {
        self.email_index.clear_async().await;
        for user in self.users.scan().await {
            let _ = self.email_index.insert_async(user.email.trim().to_lowercase(), user.id).await;
        }
    }
}
