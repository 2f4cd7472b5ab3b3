//! Achievement progression.
//!
//! Interaction mutations bump a named counter; after every positive bump
//! the engine evaluates all achievement definitions watching that counter
//! and awards the ones whose threshold is now met. Awarding is idempotent:
//! an already-earned achievement is skipped.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::model::{achievement::default_catalog, Achievement, UserAchievement, UserCounters};
use crate::store::Store;

/// A user's standing against one definition.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementView {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub progress: u64,
    pub earned_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub struct AchievementService {
    store: Arc<Store>,
}

impl AchievementService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Install the built-in catalog when none is present.
    pub async fn install_defaults(&self) {
        if !self.store.achievements.is_empty() {
            return;
        }
        for achievement in default_catalog() {
            let _ = self.store.achievements.insert(achievement.id.clone(), achievement).await;
        }
        log::info!("Installed {} default achievements", self.store.achievements.len());
    }

    /// Bump `counter` for a user by `delta` (clamped at zero) and, on a
    /// positive delta, evaluate the achievements driven by that counter.
    /// Returns the definitions newly earned by this bump.
    pub async fn bump(&self, user_id: &str, counter: &str, delta: i64) -> Vec<Achievement> {
        let value = self
            .store
            .counters
            .upsert_with(user_id.to_string(), UserCounters::new(user_id), |c| {
                let slot = c.counters.entry(counter.to_string()).or_insert(0);
                *slot = slot.saturating_add_signed(delta);
                *slot
            })
            .await;

        if delta <= 0 {
            return Vec::new();
        }
        self.evaluate(user_id, counter, value).await
    }

    async fn evaluate(&self, user_id: &str, counter: &str, value: u64) -> Vec<Achievement> {
        let definitions =
            self.store.achievements.scan_filter(|a| a.counter == counter).await;

        let mut earned = Vec::new();
        for definition in definitions {
            let key = UserAchievement::key(user_id, &definition.id);
            let newly_earned = self
                .store
                .user_achievements
                .upsert_with(
                    key,
                    UserAchievement {
                        user_id: user_id.to_string(),
                        achievement_id: definition.id.clone(),
                        progress: 0,
                        earned_at: None,
                    },
                    |ua| {
                        ua.progress = ua.progress.max(value);
                        if ua.earned_at.is_none()
                            && definition.comparator.met(value, definition.threshold)
                        {
                            ua.earned_at = Some(Utc::now());
                            true
                        } else {
                            false
                        }
                    },
                )
                .await;

            if newly_earned {
                log::info!("User {} earned achievement {}", user_id, definition.name);
                earned.push(definition);
            }
        }
        earned
    }

    /// All definitions with the user's progress merged in.
    pub async fn list_for_user(&self, user_id: &str) -> Vec<AchievementView> {
        let mut definitions = self.store.achievements.scan().await;
        definitions.sort_by(|a, b| a.id.cmp(&b.id));

        let mut out = Vec::with_capacity(definitions.len());
        for achievement in definitions {
            let standing = self
                .store
                .user_achievements
                .get(&UserAchievement::key(user_id, &achievement.id))
                .await;
            out.push(AchievementView {
                progress: standing.as_ref().map_or(0, |s| s.progress),
                earned_at: standing.and_then(|s| s.earned_at),
                achievement,
            });
        }
        out
    }

    /// The full catalog of definitions.
    pub async fn catalog(&self) -> Vec<Achievement> {
        let mut definitions = self.store.achievements.scan().await;
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        definitions
    }
}
