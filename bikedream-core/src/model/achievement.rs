//! Achievement definitions and per-user progression.
//!
//! Achievements are driven by named counters (`comments_posted`,
//! `ratings_given`, ...). Interaction mutations bump a counter and the
//! achievement engine evaluates every definition watching that counter.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a counter value is compared against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    AtLeast,
    Exactly,
}

impl Comparator {
    pub fn met(&self, value: u64, threshold: u64) -> bool {
        match self {
            Comparator::AtLeast => value >= threshold,
            Comparator::Exactly => value == threshold,
        }
    }
}

/// An achievement definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    /// Groups achievements by the counter that drives them.
    pub category: String,
    pub name: String,
    pub description: String,
    pub counter: String,
    pub threshold: u64,
    pub comparator: Comparator,
    pub points: u32,
}

/// A user's standing against one achievement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAchievement {
    pub user_id: String,
    pub achievement_id: String,
    pub progress: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earned_at: Option<DateTime<Utc>>,
}

impl UserAchievement {
    pub fn key(user_id: &str, achievement_id: &str) -> String {
        format!("{user_id}:{achievement_id}")
    }
}

/// Per-user counter document. One document per user keeps counter bumps
/// atomic at the document level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCounters {
    pub user_id: String,
    pub counters: BTreeMap<String, u64>,
}

impl UserCounters {
    pub fn new(user_id: &str) -> Self {
        Self { user_id: user_id.to_string(), counters: BTreeMap::new() }
    }

    pub fn get(&self, counter: &str) -> u64 {
        self.counters.get(counter).copied().unwrap_or(0)
    }
}

/// Counter names bumped by the interaction engine.
pub mod counters {
    pub const COMMENTS_POSTED: &str = "comments_posted";
    pub const RATINGS_GIVEN: &str = "ratings_given";
    pub const FAVORITES_COUNT: &str = "favorites_count";
    pub const GARAGE_ITEMS: &str = "garage_items";
    pub const GROUPS_JOINED: &str = "groups_joined";
}

/// The built-in achievement catalog, installed at startup when the
/// achievements collection is empty.
pub fn default_catalog() -> Vec<Achievement> {
    use counters::*;

    fn at_least(
        id: &str,
        counter: &str,
        threshold: u64,
        name: &str,
        description: &str,
        points: u32,
    ) -> Achievement {
        Achievement {
            id: id.to_string(),
            category: counter.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            counter: counter.to_string(),
            threshold,
            comparator: Comparator::AtLeast,
            points,
        }
    }

    vec![
        at_least("ach-first-favorite", FAVORITES_COUNT, 1, "First Spark", "Favorite a motorcycle", 10),
        at_least("ach-collector", FAVORITES_COUNT, 10, "Collector", "Favorite ten motorcycles", 25),
        at_least("ach-first-rating", RATINGS_GIVEN, 1, "First Verdict", "Rate a motorcycle", 10),
        at_least("ach-critic", RATINGS_GIVEN, 10, "Critic", "Rate ten motorcycles", 25),
        at_least("ach-first-comment", COMMENTS_POSTED, 1, "Ice Breaker", "Post a comment", 10),
        at_least("ach-conversationalist", COMMENTS_POSTED, 25, "Conversationalist", "Post 25 comments", 50),
        at_least("ach-garage-starter", GARAGE_ITEMS, 1, "Garage Starter", "Add a motorcycle to your garage", 10),
        at_least("ach-garage-full", GARAGE_ITEMS, 5, "Full Garage", "Track five motorcycles in your garage", 30),
        at_least("ach-joiner", GROUPS_JOINED, 1, "Joiner", "Join a rider group", 10),
        at_least("ach-community-rider", GROUPS_JOINED, 3, "Community Rider", "Ride with three groups", 25),
    ]
}
