use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{SectionId, TrainingId, UserId};

const MAX_NOTES_LEN: usize = 2000;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors that can occur when building or decoding training events.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TrainingError {
    #[error("unknown event type: {0}")]
    InvalidEventType(String),

    #[error("notes exceed 2000 characters")]
    NotesTooLong,
}

//
// ─── EVENT TYPE ────────────────────────────────────────────────────────────────
//

/// Outcome recorded for one training interaction.
///
/// - `Trained`: initial training on a section
/// - `Retrained`: refresher after the initial training
/// - `Completed`: section signed off, no further training required
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Trained,
    Retrained,
    Completed,
}

impl EventType {
    /// Stable string encoding used by storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Trained => "trained",
            EventType::Retrained => "retrained",
            EventType::Completed => "completed",
        }
    }

    /// Decodes the stable string encoding.
    ///
    /// # Errors
    ///
    /// Returns `TrainingError::InvalidEventType` for any other string.
    pub fn parse(value: &str) -> Result<Self, TrainingError> {
        match value {
            "trained" => Ok(Self::Trained),
            "retrained" => Ok(Self::Retrained),
            "completed" => Ok(Self::Completed),
            other => Err(TrainingError::InvalidEventType(other.to_owned())),
        }
    }
}

//
// ─── PROGRESS STATE ────────────────────────────────────────────────────────────
//

/// Derived per-(student, section) status. Never stored: always recomputed
/// from the most recent training event, or `NotStarted` when none exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressState {
    #[default]
    NotStarted,
    Trained,
    Retrained,
    Completed,
}

impl ProgressState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressState::NotStarted => "not started",
            ProgressState::Trained => "trained",
            ProgressState::Retrained => "retrained",
            ProgressState::Completed => "completed",
        }
    }

    /// True once any training event exists for the pair.
    #[must_use]
    pub fn is_started(self) -> bool {
        self != ProgressState::NotStarted
    }
}

impl From<EventType> for ProgressState {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Trained => ProgressState::Trained,
            EventType::Retrained => ProgressState::Retrained,
            EventType::Completed => ProgressState::Completed,
        }
    }
}

//
// ─── TRAINING EVENT ────────────────────────────────────────────────────────────
//

/// Draft of a training interaction, before validation and id assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingDraft {
    pub student_id: UserId,
    pub pi_id: UserId,
    pub section_id: SectionId,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
}

impl TrainingDraft {
    /// Normalizes and validates the draft.
    ///
    /// Notes are trimmed; blank notes collapse to `None`.
    ///
    /// # Errors
    ///
    /// Returns `TrainingError::NotesTooLong` if the trimmed notes exceed the
    /// length cap.
    pub fn validate(self) -> Result<ValidatedTraining, TrainingError> {
        let notes = match self.notes {
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    None
                } else if trimmed.chars().count() > MAX_NOTES_LEN {
                    return Err(TrainingError::NotesTooLong);
                } else {
                    Some(trimmed.to_owned())
                }
            }
            None => None,
        };

        Ok(ValidatedTraining {
            student_id: self.student_id,
            pi_id: self.pi_id,
            section_id: self.section_id,
            event_type: self.event_type,
            timestamp: self.timestamp,
            notes,
        })
    }
}

/// A validated training interaction awaiting a store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTraining {
    pub student_id: UserId,
    pub pi_id: UserId,
    pub section_id: SectionId,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
}

impl ValidatedTraining {
    #[must_use]
    pub fn assign_id(self, id: TrainingId) -> TrainingEvent {
        TrainingEvent {
            id,
            student_id: self.student_id,
            pi_id: self.pi_id,
            section_id: self.section_id,
            event_type: self.event_type,
            timestamp: self.timestamp,
            notes: self.notes,
        }
    }
}

/// One training interaction recorded by a PI for a student on a section.
///
/// Immutable once created except via explicit replace or delete through the
/// mutation sink. Many events may exist per (student, section) pair; recency
/// decides the current [`ProgressState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingEvent {
    pub id: TrainingId,
    pub student_id: UserId,
    pub pi_id: UserId,
    pub section_id: SectionId,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
