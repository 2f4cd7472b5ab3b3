//! Threaded comments with like/flag/delete moderation.
//!
//! One reply level is allowed. Like toggling is a compare-and-swap on the
//! owning comment's like-set, so concurrent likers never lose updates.
//! Deletion marks a tombstone; replies stay anchored to it.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::achievements::AchievementService;
use crate::error::{ApiError, ApiResult};
use crate::model::{achievement::counters, Comment, Role, User};
use crate::store::Store;

const MAX_CONTENT_CHARS: usize = 1000;

/// A comment shaped for the wire: author info joined at read time, the
/// caller's own like status, and tombstoned content hidden.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    pub motorcycle_id: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_picture: Option<String>,
    /// `None` for tombstones.
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<String>,
    pub like_count: usize,
    pub liked_by_me: bool,
    pub deleted: bool,
    pub created_at: chrono::DateTime<Utc>,
    pub replies: Vec<CommentView>,
}

pub struct CommentService {
    store: Arc<Store>,
    achievements: Arc<AchievementService>,
}

impl CommentService {
    pub fn new(store: Arc<Store>, achievements: Arc<AchievementService>) -> Self {
        Self { store, achievements }
    }

    /// Post a comment or a reply. Replies to replies are rejected.
    pub async fn comment(
        &self,
        user_id: &str,
        motorcycle_id: &str,
        content: &str,
        parent_comment_id: Option<String>,
    ) -> ApiResult<Comment> {
        let content = content.trim();
        if content.is_empty() || content.chars().count() > MAX_CONTENT_CHARS {
            return Err(ApiError::invalid(
                "content",
                format!("must be between 1 and {MAX_CONTENT_CHARS} characters"),
            ));
        }
        if !self.store.motorcycles.contains(motorcycle_id).await {
            return Err(ApiError::not_found("motorcycle"));
        }

        if let Some(parent_id) = &parent_comment_id {
            let parent = self
                .store
                .comments
                .get(parent_id)
                .await
                .ok_or_else(|| ApiError::not_found("comment"))?;
            if parent.motorcycle_id != motorcycle_id {
                return Err(ApiError::invalid(
                    "parent_comment_id",
                    "parent belongs to a different motorcycle",
                ));
            }
            if parent.parent_comment_id.is_some() {
                return Err(ApiError::invalid(
                    "parent_comment_id",
                    "replies cannot be nested more than one level",
                ));
            }
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            motorcycle_id: motorcycle_id.to_string(),
            user_id: user_id.to_string(),
            content: content.to_string(),
            parent_comment_id,
            liked_by: Default::default(),
            flag_count: 0,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        self.store.comments.insert(comment.id.clone(), comment.clone()).await?;
        self.achievements.bump(user_id, counters::COMMENTS_POSTED, 1).await;
        Ok(comment)
    }

    /// Toggle the caller's like. Returns the new liked state.
    pub async fn like(&self, user_id: &str, comment_id: &str) -> ApiResult<bool> {
        self.store
            .comments
            .update(comment_id, |c| {
                // Toggle under the entry lock: remove if present, insert
                // otherwise.
                if c.liked_by.remove(user_id) {
                    false
                } else {
                    c.liked_by.insert(user_id.to_string());
                    true
                }
            })
            .await
            .map_err(|_| ApiError::not_found("comment"))
    }

    /// Flag a comment for moderator review.
    pub async fn flag(&self, user_id: &str, comment_id: &str) -> ApiResult<u32> {
        let flags = self
            .store
            .comments
            .update(comment_id, |c| {
                c.flag_count += 1;
                c.flag_count
            })
            .await
            .map_err(|_| ApiError::not_found("comment"))?;
        log::warn!("Comment {comment_id} flagged by {user_id} ({flags} flags)");
        Ok(flags)
    }

    /// Tombstone a comment. Allowed for the author and for moderators.
    /// Replies remain visible under the tombstone.
    pub async fn delete(&self, caller: &User, comment_id: &str) -> ApiResult<()> {
        let comment = self
            .store
            .comments
            .get(comment_id)
            .await
            .ok_or_else(|| ApiError::not_found("comment"))?;

        if comment.user_id != caller.id && !caller.role.at_least(Role::Moderator) {
            return Err(ApiError::Forbidden { required: Role::Moderator.to_string() });
        }

        self.store
            .comments
            .update(comment_id, |c| {
                c.deleted = true;
                c.updated_at = Utc::now();
            })
            .await?;
        Ok(())
    }

    /// Threaded comments for a motorcycle: top-level newest first, replies
    /// inlined oldest first.
    pub async fn get_comments(
        &self,
        motorcycle_id: &str,
        caller: Option<&str>,
    ) -> ApiResult<Vec<CommentView>> {
        if !self.store.motorcycles.contains(motorcycle_id).await {
            return Err(ApiError::not_found("motorcycle"));
        }

        let all = self
            .store
            .comments
            .scan_filter(|c| c.motorcycle_id == motorcycle_id)
            .await;

        let mut top: Vec<&Comment> =
            all.iter().filter(|c| c.parent_comment_id.is_none()).collect();
        top.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let mut out = Vec::with_capacity(top.len());
        for parent in top {
            let mut replies: Vec<&Comment> = all
                .iter()
                .filter(|c| c.parent_comment_id.as_deref() == Some(parent.id.as_str()))
                .collect();
            replies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

            let mut view = self.view_of(parent, caller).await;
            for reply in replies {
                view.replies.push(self.view_of(reply, caller).await);
            }
            out.push(view);
        }
        Ok(out)
    }

    async fn view_of(&self, comment: &Comment, caller: Option<&str>) -> CommentView {
        let author = self.store.users.get(&comment.user_id).await;
        CommentView {
            id: comment.id.clone(),
            motorcycle_id: comment.motorcycle_id.clone(),
            user_id: comment.user_id.clone(),
            user_name: author
                .as_ref()
                .map(|u| u.name.clone())
                .unwrap_or_else(|| "Deleted rider".to_string()),
            user_picture: author.and_then(|u| u.picture_url),
            content: if comment.deleted { None } else { Some(comment.content.clone()) },
            parent_comment_id: comment.parent_comment_id.clone(),
            like_count: comment.like_count(),
            liked_by_me: caller.map_or(false, |u| comment.liked_by.contains(u)),
            deleted: comment.deleted,
            created_at: comment.created_at,
            replies: Vec::new(),
        }
    }
}
