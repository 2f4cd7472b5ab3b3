//! Rider groups.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::achievements::AchievementService;
use crate::error::{ApiError, ApiResult};
use crate::model::{achievement::counters, GroupRole, GroupType, RiderGroup};
use crate::store::Store;

/// Create payload for a rider group.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub group_type: GroupType,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub max_members: Option<u32>,
    #[serde(default = "default_public")]
    pub public: bool,
}

fn default_public() -> bool {
    true
}

pub struct GroupService {
    store: Arc<Store>,
    achievements: Arc<AchievementService>,
}

impl GroupService {
    pub fn new(store: Arc<Store>, achievements: Arc<AchievementService>) -> Self {
        Self { store, achievements }
    }

    /// Create a group. The creator joins immediately with the Creator
    /// role.
    pub async fn create(&self, creator_id: &str, input: GroupInput) -> ApiResult<RiderGroup> {
        let name = input.name.trim();
        if name.is_empty() || name.chars().count() > 100 {
            return Err(ApiError::validation("name", "must be between 1 and 100 characters"));
        }
        if input.max_members.map_or(false, |m| m < 1) {
            return Err(ApiError::validation("max_members", "must be at least 1"));
        }

        let group = RiderGroup {
            id: Uuid::new_v4().to_string(),
            creator_id: creator_id.to_string(),
            name: name.to_string(),
            description: input.description,
            group_type: input.group_type,
            location: input.location,
            max_members: input.max_members,
            public: input.public,
            members: BTreeMap::from([(creator_id.to_string(), GroupRole::Creator)]),
            created_at: Utc::now(),
        };
        self.store.groups.insert(group.id.clone(), group.clone()).await?;
        self.achievements.bump(creator_id, counters::GROUPS_JOINED, 1).await;
        Ok(group)
    }

    /// Join a group. Joining twice is a no-op; returns whether the caller
    /// was newly added. The membership check and insert run under the
    /// entry lock so a full group never over-admits.
    pub async fn join(&self, user_id: &str, group_id: &str) -> ApiResult<bool> {
        let joined = self
            .store
            .groups
            .update(group_id, |g| {
                if g.members.contains_key(user_id) {
                    return Ok(false);
                }
                if g.is_full() {
                    return Err(ApiError::conflict("group", g.id.clone()));
                }
                g.members.insert(user_id.to_string(), GroupRole::Member);
                Ok(true)
            })
            .await
            .map_err(|_| ApiError::not_found("group"))??;

        if joined {
            self.achievements.bump(user_id, counters::GROUPS_JOINED, 1).await;
        }
        Ok(joined)
    }

    /// Leave a group. The creator cannot leave their own group.
    pub async fn leave(&self, user_id: &str, group_id: &str) -> ApiResult<()> {
        let left = self
            .store
            .groups
            .update(group_id, |g| {
                if g.creator_id == user_id {
                    return Err(ApiError::invalid("group", "the creator cannot leave the group"));
                }
                Ok(g.members.remove(user_id).is_some())
            })
            .await
            .map_err(|_| ApiError::not_found("group"))??;

        if left {
            self.achievements.bump(user_id, counters::GROUPS_JOINED, -1).await;
        }
        Ok(())
    }

    pub async fn get(&self, group_id: &str) -> ApiResult<RiderGroup> {
        self.store.groups.get(group_id).await.ok_or_else(|| ApiError::not_found("group"))
    }

    /// Public groups plus the caller's own memberships, newest first.
    pub async fn list(&self, caller: Option<&str>) -> Vec<RiderGroup> {
        let mut groups = self
            .store
            .groups
            .scan_filter(|g| g.public || caller.map_or(false, |u| g.members.contains_key(u)))
            .await;
        groups.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        groups
    }
}
