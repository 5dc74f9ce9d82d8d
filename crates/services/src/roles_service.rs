use std::sync::Arc;

use track_core::model::{Capability, User, UserId, UserRole};
use storage::repository::UserRepository;

use crate::auth::AuthContext;
use crate::error::RoleServiceError;

/// Administration of lab members' roles.
#[derive(Clone)]
pub struct RoleService {
    users: Arc<dyn UserRepository>,
}

impl RoleService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// List lab members for the management table.
    ///
    /// # Errors
    ///
    /// Returns `Permission` when the caller cannot manage roles, or
    /// `Storage` on repository failures.
    pub async fn list_users(
        &self,
        ctx: &AuthContext,
        limit: u32,
    ) -> Result<Vec<User>, RoleServiceError> {
        ctx.require(Capability::ManageRoles)?;
        let users = self.users.list_users(limit).await?;
        Ok(users)
    }

    /// Assign a new role to a member.
    ///
    /// # Errors
    ///
    /// Returns `Permission` when the caller cannot manage roles, or
    /// `Storage` (`NotFound` included) on repository failures.
    pub async fn update_role(
        &self,
        ctx: &AuthContext,
        user_id: UserId,
        new_role: UserRole,
    ) -> Result<(), RoleServiceError> {
        ctx.require(Capability::ManageRoles)?;
        self.users.update_role(user_id, new_role).await?;

        tracing::info!(
            user = %user_id,
            role = new_role.as_str(),
            changed_by = %ctx.user_id(),
            "updated user role"
        );
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
