//! Ratings with derived catalog aggregates.
//!
//! `rate` upserts by (user, motorcycle) and then recomputes the
//! motorcycle's `average_rating`/`total_ratings` from a full scan of its
//! ratings. Two concurrent raters can race the recompute, so after
//! writing the aggregate the row count is re-read and the recompute
//! repeated on disagreement (bounded retry).

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::achievements::AchievementService;
use crate::error::{ApiError, ApiResult};
use crate::model::{achievement::counters, Rating};
use crate::store::Store;

const MAX_REVIEW_CHARS: usize = 500;
const AGGREGATE_RETRIES: usize = 3;

/// A rating joined with the author's current profile at read time.
#[derive(Debug, Clone, Serialize)]
pub struct RatingView {
    #[serde(flatten)]
    pub rating: Rating,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_picture: Option<String>,
}

pub struct RatingService {
    store: Arc<Store>,
    achievements: Arc<AchievementService>,
}

impl RatingService {
    pub fn new(store: Arc<Store>, achievements: Arc<AchievementService>) -> Self {
        Self { store, achievements }
    }

    /// Upsert the caller's rating and refresh the motorcycle's aggregate
    /// within the same unit of work. Returns the stored rating.
    pub async fn rate(
        &self,
        user_id: &str,
        motorcycle_id: &str,
        stars: u8,
        review_text: Option<String>,
    ) -> ApiResult<Rating> {
        if !(1..=5).contains(&stars) {
            return Err(ApiError::invalid("rating", "must be between 1 and 5"));
        }
        if let Some(review) = &review_text {
            if review.chars().count() > MAX_REVIEW_CHARS {
                return Err(ApiError::validation(
                    "review_text",
                    format!("must be at most {MAX_REVIEW_CHARS} characters"),
                ));
            }
        }
        if !self.store.motorcycles.contains(motorcycle_id).await {
            return Err(ApiError::not_found("motorcycle"));
        }

        let key = Rating::key(user_id, motorcycle_id);
        let now = Utc::now();
        let mut newly_created = false;
        let rating = self
            .store
            .ratings
            .upsert_with(
                key,
                Rating {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    motorcycle_id: motorcycle_id.to_string(),
                    stars: 0, // overwritten below; 0 marks the fresh insert
                    review_text: None,
                    created_at: now,
                    updated_at: now,
                },
                |r| {
                    newly_created = r.stars == 0;
                    r.stars = stars;
                    r.review_text = review_text.clone();
                    r.updated_at = now;
                    r.clone()
                },
            )
            .await;

        self.recompute_aggregate(motorcycle_id).await?;

        if newly_created {
            self.achievements.bump(user_id, counters::RATINGS_GIVEN, 1).await;
        }
        Ok(rating)
    }

    /// Recompute the aggregate from scratch. After writing, the row count
    /// is re-read; if another rater slipped in between the scan and the
    /// write, the recompute runs again. Transient disagreement within the
    /// retry budget resolves to the latest state.
    async fn recompute_aggregate(&self, motorcycle_id: &str) -> ApiResult<()> {
        for attempt in 0..AGGREGATE_RETRIES {
            let ratings =
                self.store.ratings.scan_filter(|r| r.motorcycle_id == motorcycle_id).await;
            let total = ratings.len() as u64;
            let average = if ratings.is_empty() {
                0.0
            } else {
                let sum: u64 = ratings.iter().map(|r| r.stars as u64).sum();
                ((sum as f64 / total as f64) * 10.0).round() / 10.0
            };

            self.store
                .motorcycles
                .update(motorcycle_id, |m| {
                    m.average_rating = average;
                    m.total_ratings = total;
                })
                .await?;

            let current = self
                .store
                .ratings
                .count_filter(|r| r.motorcycle_id == motorcycle_id)
                .await as u64;
            if current == total {
                return Ok(());
            }
            log::debug!(
                "Rating aggregate for {motorcycle_id} raced (attempt {}), retrying",
                attempt + 1
            );
        }
        Ok(())
    }

    /// Ratings for a motorcycle, newest first, with author info joined at
    /// read time.
    pub async fn get_ratings(&self, motorcycle_id: &str) -> ApiResult<Vec<RatingView>> {
        if !self.store.motorcycles.contains(motorcycle_id).await {
            return Err(ApiError::not_found("motorcycle"));
        }

        let mut ratings =
            self.store.ratings.scan_filter(|r| r.motorcycle_id == motorcycle_id).await;
        ratings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let mut out = Vec::with_capacity(ratings.len());
        for rating in ratings {
            let author = self.store.users.get(&rating.user_id).await;
            out.push(RatingView {
                user_name: author
                    .as_ref()
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Deleted rider".to_string()),
                user_picture: author.and_then(|u| u.picture_url),
                rating,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::motorcycle::tests::sample;
    use crate::model::{Role, User};

    async fn service() -> (Arc<Store>, RatingService) {
        let store = Store::new();
        store.motorcycles.insert("m-1".to_string(), sample("m-1")).await.unwrap();
        for (id, name) in [("u-1", "Ana"), ("u-2", "Bo")] {
            store
                .create_user(User {
                    id: id.to_string(),
                    email: format!("{id}@example.com"),
                    name: name.to_string(),
                    password_hash: Some("hash".to_string()),
                    external_identity: false,
                    role: Role::User,
                    picture_url: None,
                    created_at: Utc::now(),
                    deleted: false,
                })
                .await
                .unwrap();
        }
        let achievements = Arc::new(AchievementService::new(store.clone()));
        (store.clone(), RatingService::new(store, achievements))
    }

    #[tokio::test]
    async fn test_two_raters_aggregate() {
        let (store, svc) = service().await;
        svc.rate("u-1", "m-1", 4, None).await.unwrap();
        svc.rate("u-2", "m-1", 2, None).await.unwrap();

        let m = store.motorcycles.get("m-1").await.unwrap();
        assert_eq!(m.total_ratings, 2);
        assert!((m.average_rating - 3.0).abs() < 0.05);
    }

    #[tokio::test]
    async fn test_rerate_upserts() {
        let (store, svc) = service().await;
        svc.rate("u-1", "m-1", 5, Some("superb".to_string())).await.unwrap();
        svc.rate("u-1", "m-1", 3, None).await.unwrap();

        let ratings = store.ratings.scan_filter(|r| r.motorcycle_id == "m-1").await;
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].stars, 3);
        assert!(ratings[0].review_text.is_none());

        let m = store.motorcycles.get("m-1").await.unwrap();
        assert_eq!(m.total_ratings, 1);
        assert!((m.average_rating - 3.0).abs() < 0.05);
    }

    #[tokio::test]
    async fn test_stars_out_of_range_rejected() {
        let (_store, svc) = service().await;
        assert!(svc.rate("u-1", "m-1", 0, None).await.is_err());
        assert!(svc.rate("u-1", "m-1", 6, None).await.is_err());
    }

    #[tokio::test]
    async fn test_long_review_rejected() {
        let (_store, svc) = service().await;
        let review = "x".repeat(501);
        assert!(svc.rate("u-1", "m-1", 4, Some(review)).await.is_err());
    }

    #[tokio::test]
    async fn test_average_rounded_to_one_decimal() {
        let (store, svc) = service().await;
        svc.rate("u-1", "m-1", 5, None).await.unwrap();
        svc.rate("u-2", "m-1", 4, None).await.unwrap();
        // Mean 4.5 stays 4.5; add a third rating for 4.333... -> 4.3.
        store
            .create_user(User {
                id: "u-3".to_string(),
                email: "u-3@example.com".to_string(),
                name: "Cy".to_string(),
                password_hash: Some("hash".to_string()),
                external_identity: false,
                role: Role::User,
                picture_url: None,
                created_at: Utc::now(),
                deleted: false,
            })
            .await
            .unwrap();
        svc.rate("u-3", "m-1", 4, None).await.unwrap();

        let m = store.motorcycles.get("m-1").await.unwrap();
        assert!((m.average_rating - 4.3).abs() < 0.05);
    }

    #[tokio::test]
    async fn test_get_ratings_newest_first_with_author() {
        let (_store, svc) = service().await;
        svc.rate("u-1", "m-1", 4, None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        svc.rate("u-2", "m-1", 2, None).await.unwrap();

        let views = svc.get_ratings("m-1").await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].user_name, "Bo");
        assert_eq!(views[1].user_name, "Ana");
    }

    #[tokio::test]
    async fn test_concurrent_raters_converge() {
        let (store, svc) = service().await;
        let svc = Arc::new(svc);

        let mut handles = Vec::new();
        for i in 0..10 {
            let svc = svc.clone();
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let user_id = format!("racer-{i}");
                store
                    .create_user(User {
                        id: user_id.clone(),
                        email: format!("{user_id}@example.com"),
                        name: user_id.clone(),
                        password_hash: Some("hash".to_string()),
                        external_identity: false,
                        role: Role::User,
                        picture_url: None,
                        created_at: Utc::now(),
                        deleted: false,
                    })
                    .await
                    .unwrap();
                svc.rate(&user_id, "m-1", 3, None).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let m = store.motorcycles.get("m-1").await.unwrap();
        assert_eq!(m.total_ratings, 10);
        assert!((m.average_rating - 3.0).abs() < 0.05);
    }
}
