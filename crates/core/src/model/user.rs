use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("user name cannot be empty")]
    EmptyName,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("unknown user role: {0}")]
    InvalidRole(String),
}

//
// ─── ROLES ─────────────────────────────────────────────────────────────────────
//

/// Access level of a lab member.
///
/// Provisional PIs can log trainings but not remove them; full PIs can also
/// remove trainings they logged themselves; admins additionally manage roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    ProvisionalPi,
    FullPi,
    Admin,
}

impl UserRole {
    /// Stable string encoding used by storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::ProvisionalPi => "provisional_pi",
            UserRole::FullPi => "full_pi",
            UserRole::Admin => "admin",
        }
    }

    /// Human-readable label for display.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            UserRole::Student => "Student",
            UserRole::ProvisionalPi => "Provisional PI",
            UserRole::FullPi => "Full PI",
            UserRole::Admin => "Administrator",
        }
    }

    /// Decodes the stable string encoding.
    ///
    /// # Errors
    ///
    /// Returns `UserError::InvalidRole` for any other string.
    pub fn parse(value: &str) -> Result<Self, UserError> {
        match value {
            "student" => Ok(Self::Student),
            "provisional_pi" => Ok(Self::ProvisionalPi),
            "full_pi" => Ok(Self::FullPi),
            "admin" => Ok(Self::Admin),
            other => Err(UserError::InvalidRole(other.to_owned())),
        }
    }

    /// Evaluates this role's capability set.
    ///
    /// Call once per request and thread the result through, rather than
    /// re-checking the role at each decision point.
    #[must_use]
    pub fn capabilities(self) -> Capabilities {
        match self {
            UserRole::Student => Capabilities::none(),
            UserRole::ProvisionalPi => Capabilities {
                log_training: true,
                view_other_students: true,
                ..Capabilities::none()
            },
            UserRole::FullPi => Capabilities {
                log_training: true,
                delete_own_training: true,
                view_other_students: true,
                ..Capabilities::none()
            },
            UserRole::Admin => Capabilities::all(),
        }
    }
}

//
// ─── CAPABILITIES ──────────────────────────────────────────────────────────────
//

/// One named permission, used in checks and denial messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    LogTraining,
    DeleteOwnTraining,
    DeleteAnyTraining,
    ViewOtherStudents,
    ManageRoles,
}

impl Capability {
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Capability::LogTraining => "log training events",
            Capability::DeleteOwnTraining => "remove their own training events",
            Capability::DeleteAnyTraining => "remove any training event",
            Capability::ViewOtherStudents => "view other students",
            Capability::ManageRoles => "manage user roles",
        }
    }
}

/// Typed permission set derived from a [`UserRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    pub log_training: bool,
    pub delete_own_training: bool,
    pub delete_any_training: bool,
    pub view_other_students: bool,
    pub manage_roles: bool,
}

impl Capabilities {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn all() -> Self {
        Self {
            log_training: true,
            delete_own_training: true,
            delete_any_training: true,
            view_other_students: true,
            manage_roles: true,
        }
    }

    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::LogTraining => self.log_training,
            Capability::DeleteOwnTraining => self.delete_own_training,
            Capability::DeleteAnyTraining => self.delete_any_training,
            Capability::ViewOtherStudents => self.view_other_students,
            Capability::ManageRoles => self.manage_roles,
        }
    }
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// A lab member: student, PI, or administrator.
///
/// Identity and authentication live in an external provider; by the time a
/// `User` exists here it is already verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    role: UserRole,
}

impl User {
    /// Creates a user, normalizing name and email.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyName` for a blank name or
    /// `UserError::InvalidEmail` when the address lacks an `@`.
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: UserRole,
    ) -> Result<Self, UserError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(UserError::EmptyName);
        }

        let email = email.into().trim().to_owned();
        if !email.contains('@') {
            return Err(UserError::InvalidEmail(email));
        }

        Ok(Self {
            id,
            name,
            email,
            role,
        })
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Returns a copy of this user with the role replaced.
    #[must_use]
    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
