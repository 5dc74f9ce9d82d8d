mod ids;
pub mod section;
pub mod training;
pub mod user;

pub use ids::{ParseIdError, SectionId, TrainingId, UserId};

pub use section::{Section, SectionError};
pub use training::{
    EventType, ProgressState, TrainingDraft, TrainingError, TrainingEvent, ValidatedTraining,
};
pub use user::{Capabilities, Capability, User, UserError, UserRole};
