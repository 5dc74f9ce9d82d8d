use std::collections::HashMap;
use std::sync::Arc;

use track_core::model::{
    Capability, ProgressState, Section, SectionId, TrainingEvent, UserId,
};
use track_core::progress::{SectionProgress, compute_progress, history_by_section, prerequisite_chain};
use storage::repository::{SectionRepository, TrainingRepository};

use crate::auth::AuthContext;
use crate::error::StatusError;

//
// ─── STUDENT STATUS ────────────────────────────────────────────────────────────
//

/// Snapshot of one student's standing across all active sections.
///
/// Built from a single fetch; stale after any training mutation, so callers
/// re-request it rather than patching it in place.
#[derive(Debug, Clone)]
pub struct StudentStatus {
    student_id: UserId,
    sections: Vec<Section>,
    progress: HashMap<SectionId, ProgressState>,
    history: HashMap<SectionId, Vec<TrainingEvent>>,
}

impl StudentStatus {
    #[must_use]
    pub fn student_id(&self) -> UserId {
        self.student_id
    }

    /// Active sections, ordered by id.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Current progress on a section; `NotStarted` for unknown ids.
    #[must_use]
    pub fn state_of(&self, section_id: SectionId) -> ProgressState {
        self.progress.get(&section_id).copied().unwrap_or_default()
    }

    /// Ancestor chain for a section, most distant prerequisite first.
    #[must_use]
    pub fn prerequisite_chain(&self, section_id: SectionId) -> Vec<SectionProgress> {
        prerequisite_chain(section_id, &self.sections, &self.progress)
    }

    /// Recorded events for a section, newest first.
    #[must_use]
    pub fn history_for(&self, section_id: SectionId) -> &[TrainingEvent] {
        self.history
            .get(&section_id)
            .map_or(&[], Vec::as_slice)
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Read side of the tracker: progress, chains, and per-section history.
#[derive(Clone)]
pub struct StatusService {
    sections: Arc<dyn SectionRepository>,
    trainings: Arc<dyn TrainingRepository>,
}

impl StatusService {
    #[must_use]
    pub fn new(
        sections: Arc<dyn SectionRepository>,
        trainings: Arc<dyn TrainingRepository>,
    ) -> Self {
        Self {
            sections,
            trainings,
        }
    }

    /// Fetch sections and the student's events, then resolve progress.
    ///
    /// Callers always see their own status; seeing anyone else's needs the
    /// `view_other_students` capability.
    ///
    /// # Errors
    ///
    /// Returns `StatusError::Permission` when viewing another student without
    /// the capability, or `StatusError::Storage` on repository failures.
    pub async fn status_for(
        &self,
        ctx: &AuthContext,
        student_id: UserId,
    ) -> Result<StudentStatus, StatusError> {
        if student_id != ctx.user_id() {
            ctx.require(Capability::ViewOtherStudents)?;
        }

        let sections = self.sections.list_sections(true).await?;
        let events = self.trainings.trainings_for_student(student_id).await?;

        let progress = compute_progress(&sections, &events);
        let history = history_by_section(&events);

        Ok(StudentStatus {
            student_id,
            sections,
            progress,
            history,
        })
    }

    /// Shorthand for the caller's own status.
    ///
    /// # Errors
    ///
    /// Returns `StatusError::Storage` on repository failures.
    pub async fn own_status(&self, ctx: &AuthContext) -> Result<StudentStatus, StatusError> {
        self.status_for(ctx, ctx.user_id()).await
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
