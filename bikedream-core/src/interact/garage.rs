//! Virtual garages.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::achievements::AchievementService;
use crate::error::{ApiError, ApiResult};
use crate::model::{achievement::counters, GarageItem, GarageStatus};
use crate::store::Store;

/// Create/update payload for a garage item.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GarageItemInput {
    pub motorcycle_id: String,
    pub status: GarageStatus,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub mileage_km: Option<f64>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub public: bool,
}

pub struct GarageService {
    store: Arc<Store>,
    achievements: Arc<AchievementService>,
}

impl GarageService {
    pub fn new(store: Arc<Store>, achievements: Arc<AchievementService>) -> Self {
        Self { store, achievements }
    }

    pub async fn add(&self, user_id: &str, input: GarageItemInput) -> ApiResult<GarageItem> {
        if !self.store.motorcycles.contains(&input.motorcycle_id).await {
            return Err(ApiError::not_found("motorcycle"));
        }
        if input.purchase_price.map_or(false, |p| p < 0.0) {
            return Err(ApiError::validation("purchase_price", "must be non-negative"));
        }

        let now = Utc::now();
        let item = GarageItem {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            motorcycle_id: input.motorcycle_id,
            status: input.status,
            purchase_price: input.purchase_price,
            mileage_km: input.mileage_km,
            purchase_date: input.purchase_date,
            notes: input.notes,
            public: input.public,
            created_at: now,
            updated_at: now,
        };
        self.store.garage.insert(item.id.clone(), item.clone()).await?;
        self.achievements.bump(user_id, counters::GARAGE_ITEMS, 1).await;
        Ok(item)
    }

    /// The caller's garage, newest additions first.
    pub async fn list_for(&self, user_id: &str) -> Vec<GarageItem> {
        let mut items = self.store.garage.scan_filter(|g| g.user_id == user_id).await;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    pub async fn update(
        &self,
        user_id: &str,
        item_id: &str,
        input: GarageItemInput,
    ) -> ApiResult<GarageItem> {
        let item =
            self.store.garage.get(item_id).await.ok_or_else(|| ApiError::not_found("garage item"))?;
        if item.user_id != user_id {
            return Err(ApiError::not_found("garage item"));
        }

        self.store
            .garage
            .update(item_id, |g| {
                g.status = input.status;
                g.purchase_price = input.purchase_price;
                g.mileage_km = input.mileage_km;
                g.purchase_date = input.purchase_date;
                g.notes = input.notes.clone();
                g.public = input.public;
                g.updated_at = Utc::now();
                g.clone()
            })
            .await
            .map_err(Into::into)
    }

    pub async fn remove(&self, user_id: &str, item_id: &str) -> ApiResult<()> {
        let item =
            self.store.garage.get(item_id).await.ok_or_else(|| ApiError::not_found("garage item"))?;
        if item.user_id != user_id {
            return Err(ApiError::not_found("garage item"));
        }
        self.store.garage.remove(item_id).await;
        self.achievements.bump(user_id, counters::GARAGE_ITEMS, -1).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::motorcycle::tests::sample;

    fn input() -> GarageItemInput {
        GarageItemInput {
            motorcycle_id: "m-1".to_string(),
            status: GarageStatus::Owned,
            purchase_price: Some(9000.0),
            mileage_km: Some(1200.0),
            purchase_date: None,
            notes: "first big bike".to_string(),
            public: true,
        }
    }

    async fn service() -> (Arc<Store>, GarageService) {
        let store = Store::new();
        store.motorcycles.insert("m-1".to_string(), sample("m-1")).await.unwrap();
        let achievements = Arc::new(AchievementService::new(store.clone()));
        (store.clone(), GarageService::new(store, achievements))
    }

    #[tokio::test]
    async fn test_add_list_update_remove() {
        let (_store, svc) = service().await;
        let item = svc.add("u-1", input()).await.unwrap();
        assert_eq!(svc.list_for("u-1").await.len(), 1);

        let mut updated = input();
        updated.status = GarageStatus::PreviouslyOwned;
        let item = svc.update("u-1", &item.id, updated).await.unwrap();
        assert_eq!(item.status, GarageStatus::PreviouslyOwned);

        svc.remove("u-1", &item.id).await.unwrap();
        assert!(svc.list_for("u-1").await.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_items_look_absent() {
        let (_store, svc) = service().await;
        let item = svc.add("u-1", input()).await.unwrap();

        assert!(matches!(
            svc.update("u-2", &item.id, input()).await.unwrap_err(),
            ApiError::NotFound { .. }
        ));
        assert!(matches!(
            svc.remove("u-2", &item.id).await.unwrap_err(),
            ApiError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_unknown_motorcycle_rejected() {
        let (_store, svc) = service().await;
        let mut bad = input();
        bad.motorcycle_id = "ghost".to_string();
        assert!(svc.add("u-1", bad).await.is_err());
    }
}
