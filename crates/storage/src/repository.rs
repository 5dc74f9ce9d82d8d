use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use track_core::model::{
    Section, SectionId, TrainingEvent, TrainingId, User, UserId, UserRole, ValidatedTraining,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for training sections.
#[async_trait]
pub trait SectionRepository: Send + Sync {
    /// Persist or update a section.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the section cannot be stored.
    async fn upsert_section(&self, section: &Section) -> Result<(), StorageError>;

    /// Fetch a section by ID, or `None` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_section(&self, id: SectionId) -> Result<Option<Section>, StorageError>;

    /// List sections, optionally restricted to active ones.
    ///
    /// Ordered by ID for stable output.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_sections(&self, only_active: bool) -> Result<Vec<Section>, StorageError>;
}

/// Repository contract for lab members.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist or update a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if another user already holds the
    /// same email.
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Fetch a user by ID, or `None` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// Look up a user by email, or `None` when missing.
    ///
    /// Trainings are logged against a student identified by email.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// List users ordered by name, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_users(&self, limit: u32) -> Result<Vec<User>, StorageError>;

    /// Replace a user's role.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user does not exist.
    async fn update_role(&self, id: UserId, role: UserRole) -> Result<(), StorageError>;
}

/// Repository contract for training events.
#[async_trait]
pub trait TrainingRepository: Send + Sync {
    /// Insert a validated training event and return the store-assigned ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the event cannot be stored.
    async fn insert_training(
        &self,
        training: &ValidatedTraining,
    ) -> Result<TrainingId, StorageError>;

    /// Replace an existing training event (edit = replace semantics).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the event does not exist.
    async fn update_training(&self, event: &TrainingEvent) -> Result<(), StorageError>;

    /// Remove a training event.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the event does not exist.
    async fn delete_training(&self, id: TrainingId) -> Result<(), StorageError>;

    /// Fetch a training event by ID, or `None` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_training(&self, id: TrainingId) -> Result<Option<TrainingEvent>, StorageError>;

    /// All events for one student, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn trainings_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<TrainingEvent>, StorageError>;

    /// Events a PI logged, newest first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn recent_trainings_for_pi(
        &self,
        pi_id: UserId,
        limit: u32,
    ) -> Result<Vec<TrainingEvent>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sections: Arc<Mutex<HashMap<SectionId, Section>>>,
    users: Arc<Mutex<HashMap<UserId, User>>>,
    trainings: Arc<Mutex<HashMap<TrainingId, TrainingEvent>>>,
    next_training_id: Arc<Mutex<u64>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SectionRepository for InMemoryRepository {
    async fn upsert_section(&self, section: &Section) -> Result<(), StorageError> {
        let mut guard = self
            .sections
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(section.id(), section.clone());
        Ok(())
    }

    async fn get_section(&self, id: SectionId) -> Result<Option<Section>, StorageError> {
        let guard = self
            .sections
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_sections(&self, only_active: bool) -> Result<Vec<Section>, StorageError> {
        let guard = self
            .sections
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut sections: Vec<Section> = guard
            .values()
            .filter(|section| !only_active || section.is_active())
            .cloned()
            .collect();
        sections.sort_by_key(Section::id);
        Ok(sections)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let taken = guard
            .values()
            .any(|existing| existing.email() == user.email() && existing.id() != user.id());
        if taken {
            return Err(StorageError::Conflict);
        }
        guard.insert(user.id(), user.clone());
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.values().find(|user| user.email() == email).cloned())
    }

    async fn list_users(&self, limit: u32) -> Result<Vec<User>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut users: Vec<User> = guard.values().cloned().collect();
        users.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.email().cmp(b.email())));
        users.truncate(limit as usize);
        Ok(users)
    }

    async fn update_role(&self, id: UserId, role: UserRole) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.get(&id) {
            Some(user) => {
                let updated = user.clone().with_role(role);
                guard.insert(id, updated);
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }
}

#[async_trait]
impl TrainingRepository for InMemoryRepository {
    async fn insert_training(
        &self,
        training: &ValidatedTraining,
    ) -> Result<TrainingId, StorageError> {
        let mut next = self
            .next_training_id
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *next += 1;
        let id = TrainingId::new(*next);
        drop(next);

        let event = training.clone().assign_id(id);
        let mut guard = self
            .trainings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(id, event);
        Ok(id)
    }

    async fn update_training(&self, event: &TrainingEvent) -> Result<(), StorageError> {
        let mut guard = self
            .trainings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if !guard.contains_key(&event.id) {
            return Err(StorageError::NotFound);
        }
        guard.insert(event.id, event.clone());
        Ok(())
    }

    async fn delete_training(&self, id: TrainingId) -> Result<(), StorageError> {
        let mut guard = self
            .trainings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&id).map(|_| ()).ok_or(StorageError::NotFound)
    }

    async fn get_training(&self, id: TrainingId) -> Result<Option<TrainingEvent>, StorageError> {
        let guard = self
            .trainings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn trainings_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<TrainingEvent>, StorageError> {
        let guard = self
            .trainings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut events: Vec<TrainingEvent> = guard
            .values()
            .filter(|event| event.student_id == student_id)
            .cloned()
            .collect();
        events.sort_by_key(|event| (event.timestamp, event.id));
        Ok(events)
    }

    async fn recent_trainings_for_pi(
        &self,
        pi_id: UserId,
        limit: u32,
    ) -> Result<Vec<TrainingEvent>, StorageError> {
        let guard = self
            .trainings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut events: Vec<TrainingEvent> = guard
            .values()
            .filter(|event| event.pi_id == pi_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        events.truncate(limit as usize);
        Ok(events)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sections: Arc<dyn SectionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub trainings: Arc<dyn TrainingRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let sections: Arc<dyn SectionRepository> = Arc::new(repo.clone());
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let trainings: Arc<dyn TrainingRepository> = Arc::new(repo);
        Self {
            sections,
            users,
            trainings,
        }
    }
}
