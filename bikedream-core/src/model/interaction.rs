//! User-generated content tied to catalog records: favorites, ratings and
//! threaded comments.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A (user, motorcycle) bookmark. Unique per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: String,
    pub motorcycle_id: String,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    /// Storage key enforcing pair uniqueness.
    pub fn key(user_id: &str, motorcycle_id: &str) -> String {
        format!("{user_id}:{motorcycle_id}")
    }
}

/// A star rating with optional review text. At most one per
/// (user, motorcycle); a second submission updates the first in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: String,
    pub user_id: String,
    pub motorcycle_id: String,
    /// 1..=5.
    pub stars: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rating {
    /// Storage key enforcing the one-rating-per-pair invariant.
    pub fn key(user_id: &str, motorcycle_id: &str) -> String {
        format!("{user_id}:{motorcycle_id}")
    }
}

/// A comment on a motorcycle. One reply level is allowed: a comment with a
/// parent can never itself be a parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub motorcycle_id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<String>,
    /// Like membership. The like count is derived from this set, which
    /// keeps count and membership consistent by construction.
    #[serde(default)]
    pub liked_by: BTreeSet<String>,
    #[serde(default)]
    pub flag_count: u32,
    /// Tombstone marker. A deleted comment keeps its id so replies stay
    /// anchored; its content is hidden on render.
    #[serde(default)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn like_count(&self) -> usize {
        self.liked_by.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_keys() {
        assert_eq!(Favorite::key("u-1", "m-2"), "u-1:m-2");
        assert_eq!(Rating::key("u-1", "m-2"), "u-1:m-2");
    }

    #[test]
    fn test_like_count_follows_set() {
        let mut c = Comment {
            id: "c-1".to_string(),
            motorcycle_id: "m-1".to_string(),
            user_id: "u-1".to_string(),
            content: "Great tourer".to_string(),
            parent_comment_id: None,
            liked_by: BTreeSet::new(),
            flag_count: 0,
            deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(c.like_count(), 0);
        c.liked_by.insert("u-2".to_string());
        c.liked_by.insert("u-3".to_string());
        c.liked_by.insert("u-2".to_string());
        assert_eq!(c.like_count(), 2);
    }
}
