//! Authenticated caller identity, as established by the HTTP layer.

use crate::domain::foundation::UserId;

/// Who is making the request.
///
/// Admins may read and create payments for any user; everyone else is scoped
/// to their own rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Actor {
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    /// Whether this actor may act on rows belonging to `owner`.
    pub fn can_access(&self, owner: UserId) -> bool {
        self.is_admin || self.user_id == owner
    }
}
