use std::sync::Arc;

use chrono::{DateTime, Utc};

use track_core::model::{
    Capability, EventType, SectionId, TrainingDraft, TrainingEvent, TrainingId,
};
use track_core::time::Clock;
use storage::repository::{SectionRepository, TrainingRepository, UserRepository};

use crate::auth::AuthContext;
use crate::error::TrainingServiceError;

//
// ─── REQUEST ───────────────────────────────────────────────────────────────────
//

/// Input for logging one training interaction.
///
/// The student is addressed by email (the identifier PIs actually know);
/// a missing timestamp defaults to the service clock.
#[derive(Debug, Clone)]
pub struct LogTrainingRequest {
    pub student_email: String,
    pub section_id: SectionId,
    pub event_type: EventType,
    pub timestamp: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Write side of the tracker: log, replace, and remove training events.
///
/// Every mutation invalidates previously fetched status snapshots; callers
/// re-query `StatusService` afterwards.
#[derive(Clone)]
pub struct TrainingService {
    clock: Clock,
    sections: Arc<dyn SectionRepository>,
    users: Arc<dyn UserRepository>,
    trainings: Arc<dyn TrainingRepository>,
}

impl TrainingService {
    #[must_use]
    pub fn new(
        clock: Clock,
        sections: Arc<dyn SectionRepository>,
        users: Arc<dyn UserRepository>,
        trainings: Arc<dyn TrainingRepository>,
    ) -> Self {
        Self {
            clock,
            sections,
            users,
            trainings,
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to the service's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Record a training event for a student, on behalf of the caller.
    ///
    /// # Errors
    ///
    /// Returns `Permission` when the caller cannot log trainings,
    /// `StudentNotFound` for an unknown email, `SectionNotFound` /
    /// `SectionInactive` for a bad section, `Training` for invalid draft
    /// fields, or `Storage` on repository failures.
    pub async fn log_training(
        &self,
        ctx: &AuthContext,
        request: LogTrainingRequest,
    ) -> Result<TrainingEvent, TrainingServiceError> {
        ctx.require(Capability::LogTraining)?;

        let email = request.student_email.trim();
        let student = self
            .users
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| TrainingServiceError::StudentNotFound(email.to_owned()))?;

        let section = self
            .sections
            .get_section(request.section_id)
            .await?
            .ok_or(TrainingServiceError::SectionNotFound(request.section_id))?;
        if !section.is_active() {
            return Err(TrainingServiceError::SectionInactive(section.id()));
        }

        let draft = TrainingDraft {
            student_id: student.id(),
            pi_id: ctx.user_id(),
            section_id: section.id(),
            event_type: request.event_type,
            timestamp: request.timestamp.unwrap_or_else(|| self.clock.now()),
            notes: request.notes,
        };
        let validated = draft.validate()?;
        let id = self.trainings.insert_training(&validated).await?;

        tracing::info!(
            training = %id,
            student = %student.id(),
            pi = %ctx.user_id(),
            section = %section.id(),
            event_type = request.event_type.as_str(),
            "logged training event"
        );

        Ok(validated.assign_id(id))
    }

    /// Replace an existing training event.
    ///
    /// Callers may edit events they logged themselves; editing anyone else's
    /// needs `delete_any_training` (replace and remove share the ownership
    /// rule).
    ///
    /// # Errors
    ///
    /// Returns `TrainingNotFound` for an unknown id, `Permission` on
    /// ownership/capability failures, or `Storage` on repository failures.
    pub async fn update_training(
        &self,
        ctx: &AuthContext,
        event: TrainingEvent,
    ) -> Result<(), TrainingServiceError> {
        let existing = self
            .trainings
            .get_training(event.id)
            .await?
            .ok_or(TrainingServiceError::TrainingNotFound(event.id))?;
        self.check_ownership(ctx, &existing)?;

        self.trainings.update_training(&event).await?;

        tracing::info!(training = %event.id, editor = %ctx.user_id(), "replaced training event");
        Ok(())
    }

    /// Remove a training event.
    ///
    /// # Errors
    ///
    /// Returns `TrainingNotFound` for an unknown id, `Permission` on
    /// ownership/capability failures, or `Storage` on repository failures.
    pub async fn delete_training(
        &self,
        ctx: &AuthContext,
        id: TrainingId,
    ) -> Result<(), TrainingServiceError> {
        let existing = self
            .trainings
            .get_training(id)
            .await?
            .ok_or(TrainingServiceError::TrainingNotFound(id))?;
        self.check_ownership(ctx, &existing)?;

        self.trainings.delete_training(id).await?;

        tracing::info!(training = %id, editor = %ctx.user_id(), "removed training event");
        Ok(())
    }

    /// The caller's own recently logged events, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on repository failures.
    pub async fn recent_trainings(
        &self,
        ctx: &AuthContext,
        limit: u32,
    ) -> Result<Vec<TrainingEvent>, TrainingServiceError> {
        let events = self
            .trainings
            .recent_trainings_for_pi(ctx.user_id(), limit)
            .await?;
        Ok(events)
    }

    fn check_ownership(
        &self,
        ctx: &AuthContext,
        event: &TrainingEvent,
    ) -> Result<(), TrainingServiceError> {
        if event.pi_id == ctx.user_id() {
            ctx.require(Capability::DeleteOwnTraining)?;
        } else {
            ctx.require(Capability::DeleteAnyTraining)?;
        }
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
