//! User administration.

use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::model::{Role, UserView};
use crate::store::Store;

pub struct UserAdminService {
    store: Arc<Store>,
}

impl UserAdminService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Every live account, oldest first.
    pub async fn list(&self) -> Vec<UserView> {
        let mut users = self.store.users.scan_filter(|u| !u.deleted).await;
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        users.iter().map(|u| u.public_view()).collect()
    }

    /// Change a user's role. Admin-gated at the HTTP surface.
    pub async fn set_role(&self, user_id: &str, new_role: Role) -> ApiResult<UserView> {
        self.store
            .users
            .update(user_id, |u| {
                u.role = new_role;
                u.public_view()
            })
            .await
            .map_err(|_| ApiError::not_found("user"))
    }
}
