//! Banner management.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::model::Banner;
use crate::store::Store;

const MAX_MESSAGE_CHARS: usize = 500;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BannerInput {
    pub message: String,
    #[serde(default)]
    pub priority: u8,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl BannerInput {
    fn validate(&self) -> ApiResult<()> {
        let chars = self.message.trim().chars().count();
        if chars == 0 || chars > MAX_MESSAGE_CHARS {
            return Err(ApiError::validation(
                "message",
                format!("must be between 1 and {MAX_MESSAGE_CHARS} characters"),
            ));
        }
        if self.priority > 100 {
            return Err(ApiError::validation("priority", "must be between 0 and 100"));
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.ends_at) {
            if start > end {
                return Err(ApiError::validation("ends_at", "must not precede starts_at"));
            }
        }
        Ok(())
    }
}

pub struct BannerService {
    store: Arc<Store>,
}

impl BannerService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Banners currently live, ordered priority desc then created_at desc.
    pub async fn live(&self) -> Vec<Banner> {
        let now = Utc::now();
        let mut banners = self.store.banners.scan_filter(|b| b.is_live_at(now)).await;
        banners.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        banners
    }

    /// Every banner, for the admin view.
    pub async fn list_all(&self) -> Vec<Banner> {
        let mut banners = self.store.banners.scan().await;
        banners.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        banners
    }

    pub async fn create(&self, input: BannerInput) -> ApiResult<Banner> {
        input.validate()?;
        let now = Utc::now();
        let banner = Banner {
            id: Uuid::new_v4().to_string(),
            message: input.message.trim().to_string(),
            priority: input.priority,
            active: input.active,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            created_at: now,
            updated_at: now,
        };
        self.store.banners.insert(banner.id.clone(), banner.clone()).await?;
        Ok(banner)
    }

    pub async fn update(&self, id: &str, input: BannerInput) -> ApiResult<Banner> {
        input.validate()?;
        self.store
            .banners
            .update(id, |b| {
                b.message = input.message.trim().to_string();
                b.priority = input.priority;
                b.active = input.active;
                b.starts_at = input.starts_at;
                b.ends_at = input.ends_at;
                b.updated_at = Utc::now();
                b.clone()
            })
            .await
            .map_err(|_| ApiError::not_found("banner"))
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.store
            .banners
            .remove(id)
            .await
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found("banner"))
    }
}
