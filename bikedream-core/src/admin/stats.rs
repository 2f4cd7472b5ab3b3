//! Aggregate statistics.
//!
//! Counts are computed at request time from the same collections the
//! paginated listing reads, so the stats endpoint can never disagree with
//! the catalog.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::store::Store;

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub motorcycles: usize,
    pub users: usize,
    pub ratings: usize,
    pub comments: usize,
    pub favorites: usize,
    pub garage_items: usize,
    pub groups: usize,
    pub requests: usize,
    pub banners: usize,
    pub last_7_days: WeeklyDeltas,
}

/// New records over the trailing week.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyDeltas {
    pub new_users: usize,
    pub new_ratings: usize,
    pub new_comments: usize,
    pub new_favorites: usize,
    pub new_requests: usize,
}

pub struct StatsService {
    store: Arc<Store>,
}

impl StatsService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn snapshot(&self) -> AdminStats {
        let cutoff = Utc::now() - Duration::days(7);
        AdminStats {
            motorcycles: self.store.motorcycles.len(),
            users: self.store.users.count_filter(|u| !u.deleted).await,
            ratings: self.store.ratings.len(),
            comments: self.store.comments.len(),
            favorites: self.store.favorites.len(),
            garage_items: self.store.garage.len(),
            groups: self.store.groups.len(),
            requests: self.store.requests.len(),
            banners: self.store.banners.len(),
            last_7_days: WeeklyDeltas {
                new_users: self.store.users.count_filter(|u| u.created_at >= cutoff).await,
                new_ratings: self.store.ratings.count_filter(|r| r.created_at >= cutoff).await,
                new_comments: self.store.comments.count_filter(|c| c.created_at >= cutoff).await,
                new_favorites: self.store.favorites.count_filter(|f| f.created_at >= cutoff).await,
                new_requests: self.store.requests.count_filter(|r| r.created_at >= cutoff).await,
            },
        }
    }
}
