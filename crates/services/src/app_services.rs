use std::sync::Arc;

use storage::repository::Storage;
use track_core::time::Clock;

use crate::error::AppServicesError;
use crate::roles_service::RoleService;
use crate::status_service::StatusService;
use crate::training_service::TrainingService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    status: Arc<StatusService>,
    training: Arc<TrainingService>,
    roles: Arc<RoleService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over in-memory storage (tests, prototyping).
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let status = Arc::new(StatusService::new(
            Arc::clone(&storage.sections),
            Arc::clone(&storage.trainings),
        ));
        let training = Arc::new(TrainingService::new(
            clock,
            Arc::clone(&storage.sections),
            Arc::clone(&storage.users),
            Arc::clone(&storage.trainings),
        ));
        let roles = Arc::new(RoleService::new(Arc::clone(&storage.users)));

        Self {
            status,
            training,
            roles,
        }
    }

    #[must_use]
    pub fn status(&self) -> Arc<StatusService> {
        Arc::clone(&self.status)
    }

    #[must_use]
    pub fn training(&self) -> Arc<TrainingService> {
        Arc::clone(&self.training)
    }

    #[must_use]
    pub fn roles(&self) -> Arc<RoleService> {
        Arc::clone(&self.roles)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
