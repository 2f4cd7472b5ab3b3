//! User requests (missing motorcycles, data corrections, feature asks)
//! and their admin triage.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::model::{RequestPriority, RequestStatus, UserRequest};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestInput {
    pub request_type: String,
    #[serde(default = "default_priority")]
    pub priority: RequestPriority,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

fn default_priority() -> RequestPriority {
    RequestPriority::Medium
}

/// Admin response payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestResponseInput {
    pub status: RequestStatus,
    #[serde(default)]
    pub admin_response: Option<String>,
}

pub struct RequestService {
    store: Arc<Store>,
}

impl RequestService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, user_id: &str, input: RequestInput) -> ApiResult<UserRequest> {
        let title = input.title.trim();
        if title.is_empty() || title.chars().count() > 200 {
            return Err(ApiError::validation("title", "must be between 1 and 200 characters"));
        }
        if input.request_type.trim().is_empty() {
            return Err(ApiError::validation("request_type", "must not be empty"));
        }

        let now = Utc::now();
        let request = UserRequest {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            request_type: input.request_type.trim().to_string(),
            priority: input.priority,
            title: title.to_string(),
            description: input.description,
            status: RequestStatus::Pending,
            admin_response: None,
            created_at: now,
            updated_at: now,
        };
        self.store.requests.insert(request.id.clone(), request.clone()).await?;
        Ok(request)
    }

    /// The caller's own requests, newest first.
    pub async fn list_for(&self, user_id: &str) -> Vec<UserRequest> {
        let mut requests = self.store.requests.scan_filter(|r| r.user_id == user_id).await;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    /// Every request, for the admin triage view, newest first.
    pub async fn list_all(&self, status: Option<RequestStatus>) -> Vec<UserRequest> {
        let mut requests = self
            .store
            .requests
            .scan_filter(|r| status.map_or(true, |s| r.status == s))
            .await;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    /// Record the admin's verdict.
    pub async fn respond(
        &self,
        request_id: &str,
        input: RequestResponseInput,
    ) -> ApiResult<UserRequest> {
        self.store
            .requests
            .update(request_id, |r| {
                r.status = input.status;
                r.admin_response = input.admin_response.clone();
                r.updated_at = Utc::now();
                r.clone()
            })
            .await
            .map_err(|_| ApiError::not_found("request"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RequestInput {
        RequestInput {
            request_type: "missing_motorcycle".to_string(),
            priority: RequestPriority::High,
            title: "Add the new Transalp".to_string(),
            description: "2025 model is missing".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_respond() {
        let svc = RequestService::new(Store::new());
        let request = svc.create("u-1", input()).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);

        let updated = svc
            .respond(
                &request.id,
                RequestResponseInput {
                    status: RequestStatus::Resolved,
                    admin_response: Some("Added in the next catalog pass".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, RequestStatus::Resolved);
        assert!(updated.admin_response.is_some());
    }

    #[tokio::test]
    async fn test_listing_scopes() {
        let svc = RequestService::new(Store::new());
        svc.create("u-1", input()).await.unwrap();
        svc.create("u-2", input()).await.unwrap();

        assert_eq!(svc.list_for("u-1").await.len(), 1);
        assert_eq!(svc.list_all(None).await.len(), 2);
        assert_eq!(svc.list_all(Some(RequestStatus::Resolved)).await.len(), 0);
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let svc = RequestService::new(Store::new());
        let mut bad = input();
        bad.title = "  ".to_string();
        assert!(svc.create("u-1", bad).await.is_err());
    }
}
