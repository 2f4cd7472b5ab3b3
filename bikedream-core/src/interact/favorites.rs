//! Favorites: idempotent per-(user, motorcycle) bookmarks.

use std::sync::Arc;

use chrono::Utc;

use super::achievements::AchievementService;
use crate::error::{ApiError, ApiResult};
use crate::model::{achievement::counters, Favorite, Motorcycle};
use crate::store::{Store, StoreError};

pub struct FavoriteService {
    store: Arc<Store>,
    achievements: Arc<AchievementService>,
}

impl FavoriteService {
    pub fn new(store: Arc<Store>, achievements: Arc<AchievementService>) -> Self {
        Self { store, achievements }
    }

    /// Add a favorite. A second call for the same pair is a no-op, not an
    /// error; returns whether the favorite was newly created.
    pub async fn favorite(&self, user_id: &str, motorcycle_id: &str) -> ApiResult<bool> {
        if !self.store.motorcycles.contains(motorcycle_id).await {
            return Err(ApiError::not_found("motorcycle"));
        }

        let favorite = Favorite {
            user_id: user_id.to_string(),
            motorcycle_id: motorcycle_id.to_string(),
            created_at: Utc::now(),
        };
        match self
            .store
            .favorites
            .insert(Favorite::key(user_id, motorcycle_id), favorite)
            .await
        {
            Ok(()) => {
                self.achievements.bump(user_id, counters::FAVORITES_COUNT, 1).await;
                Ok(true)
            }
            Err(StoreError::Conflict { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a favorite. Removing an absent favorite is a no-op; returns
    /// whether anything was removed.
    pub async fn unfavorite(&self, user_id: &str, motorcycle_id: &str) -> ApiResult<bool> {
        if !self.store.motorcycles.contains(motorcycle_id).await {
            return Err(ApiError::not_found("motorcycle"));
        }

        let removed =
            self.store.favorites.remove(&Favorite::key(user_id, motorcycle_id)).await.is_some();
        if removed {
            self.achievements.bump(user_id, counters::FAVORITES_COUNT, -1).await;
        }
        Ok(removed)
    }

    /// The user's favorited motorcycles, most recently favorited first.
    pub async fn list_for(&self, user_id: &str) -> Vec<Motorcycle> {
        let mut favorites =
            self.store.favorites.scan_filter(|f| f.user_id == user_id).await;
        favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut out = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            if let Some(m) = self.store.motorcycles.get(&favorite.motorcycle_id).await {
                out.push(m);
            }
        }
        out
    }

    pub async fn is_favorite(&self, user_id: &str, motorcycle_id: &str) -> bool {
        self.store.favorites.contains(&Favorite::key(user_id, motorcycle_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::motorcycle::tests::sample;

    async fn service() -> (Arc<Store>, FavoriteService) {
        let store = Store::new();
        store.motorcycles.insert("m-1".to_string(), sample("m-1")).await.unwrap();
        let achievements = Arc::new(AchievementService::new(store.clone()));
        (store.clone(), FavoriteService::new(store, achievements))
    }

    #[tokio::test]
    async fn test_favorite_is_idempotent() {
        let (_store, svc) = service().await;
        assert!(svc.favorite("u-1", "m-1").await.unwrap());
        assert!(!svc.favorite("u-1", "m-1").await.unwrap());
        assert!(svc.is_favorite("u-1", "m-1").await);
    }

    #[tokio::test]
    async fn test_favorite_then_unfavorite_restores_pre_state() {
        let (_store, svc) = service().await;
        assert!(svc.favorite("u-1", "m-1").await.unwrap());
        assert!(svc.unfavorite("u-1", "m-1").await.unwrap());
        assert!(!svc.is_favorite("u-1", "m-1").await);

        // Unfavoriting an absent favorite is a no-op.
        assert!(!svc.unfavorite("u-1", "m-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_motorcycle_is_not_found() {
        let (_store, svc) = service().await;
        assert!(matches!(
            svc.favorite("u-1", "ghost").await.unwrap_err(),
            ApiError::NotFound { .. }
        ));
        assert!(matches!(
            svc.unfavorite("u-1", "ghost").await.unwrap_err(),
            ApiError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_list_joins_records() {
        let (store, svc) = service().await;
        store.motorcycles.insert("m-2".to_string(), sample("m-2")).await.unwrap();
        svc.favorite("u-1", "m-1").await.unwrap();
        svc.favorite("u-1", "m-2").await.unwrap();
        svc.favorite("u-2", "m-1").await.unwrap();

        let list = svc.list_for("u-1").await;
        assert_eq!(list.len(), 2);
    }
}
