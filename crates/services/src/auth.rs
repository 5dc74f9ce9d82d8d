//! Explicit authenticated-caller context.
//!
//! There is no ambient "current user": every operation that needs an
//! identity receives an [`AuthContext`] built from an already-verified
//! [`User`]. Capabilities are evaluated once, at construction.

use thiserror::Error;

use track_core::model::{Capabilities, Capability, User, UserId, UserRole};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A caller attempted an operation their role does not grant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{} may not {}", .role.label(), .capability.describe())]
pub struct PermissionError {
    pub role: UserRole,
    pub capability: Capability,
}

//
// ─── AUTH CONTEXT ──────────────────────────────────────────────────────────────
//

/// The authenticated caller of a service operation.
#[derive(Debug, Clone)]
pub struct AuthContext {
    user: User,
    capabilities: Capabilities,
}

impl AuthContext {
    #[must_use]
    pub fn new(user: User) -> Self {
        let capabilities = user.role().capabilities();
        Self { user, capabilities }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user.id()
    }

    #[must_use]
    pub fn role(&self) -> UserRole {
        self.user.role()
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.allows(capability)
    }

    /// Checks a capability, logging and returning a typed error on denial.
    ///
    /// # Errors
    ///
    /// Returns `PermissionError` when the caller's role lacks the capability.
    pub fn require(&self, capability: Capability) -> Result<(), PermissionError> {
        if self.capabilities.allows(capability) {
            return Ok(());
        }
        tracing::warn!(
            user = %self.user.id(),
            role = self.user.role().as_str(),
            capability = capability.describe(),
            "permission denied"
        );
        Err(PermissionError {
            role: self.user.role(),
            capability,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
