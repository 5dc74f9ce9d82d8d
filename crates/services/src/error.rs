//! Shared error types for the services crate.

use thiserror::Error;

use track_core::model::{SectionId, TrainingError, TrainingId, UserError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::auth::PermissionError;

/// Errors emitted by `StatusService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatusError {
    #[error(transparent)]
    Permission(#[from] PermissionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `TrainingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrainingServiceError {
    #[error("no student with email {0}")]
    StudentNotFound(String),
    #[error("section {0} does not exist")]
    SectionNotFound(SectionId),
    #[error("section {0} is no longer active")]
    SectionInactive(SectionId),
    #[error("training event {0} does not exist")]
    TrainingNotFound(TrainingId),
    #[error(transparent)]
    Permission(#[from] PermissionError),
    #[error(transparent)]
    Training(#[from] TrainingError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RoleService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoleServiceError {
    #[error(transparent)]
    Permission(#[from] PermissionError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
