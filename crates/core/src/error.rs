use thiserror::Error;

use crate::model::section::SectionError;
use crate::model::training::TrainingError;
use crate::model::user::UserError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Section(#[from] SectionError),
    #[error(transparent)]
    Training(#[from] TrainingError),
    #[error(transparent)]
    User(#[from] UserError),
}
