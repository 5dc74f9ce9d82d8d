use sqlx::Row;
use uuid::Uuid;

use track_core::model::{
    EventType, Section, SectionId, TrainingEvent, TrainingId, User, UserId, UserRole,
};

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn section_id_from_i64(v: i64) -> Result<SectionId, StorageError> {
    Ok(SectionId::new(i64_to_u64("section_id", v)?))
}

pub(crate) fn section_id_to_i64(id: SectionId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("section_id overflow".into()))
}

pub(crate) fn training_id_from_i64(v: i64) -> Result<TrainingId, StorageError> {
    Ok(TrainingId::new(i64_to_u64("training_id", v)?))
}

pub(crate) fn training_id_to_i64(id: TrainingId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("training_id overflow".into()))
}

/// User ids are persisted as canonical UUID text.
pub(crate) fn user_id_from_str(s: &str) -> Result<UserId, StorageError> {
    s.parse::<Uuid>()
        .map(UserId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid user id: {s}")))
}

pub(crate) fn user_id_to_string(id: UserId) -> String {
    id.value().to_string()
}

pub(crate) fn map_section_row(row: &sqlx::sqlite::SqliteRow) -> Result<Section, StorageError> {
    let id = section_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let prereq = row
        .try_get::<Option<i64>, _>("prereq")
        .map_err(ser)?
        .map(section_id_from_i64)
        .transpose()?;
    let active: i64 = row.try_get("active").map_err(ser)?;

    Section::new(
        id,
        row.try_get::<String, _>("name").map_err(ser)?,
        prereq,
        active != 0,
    )
    .map_err(ser)
}

pub(crate) fn map_user_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
    let id = user_id_from_str(row.try_get::<String, _>("id").map_err(ser)?.as_str())?;
    let role_str: String = row.try_get("role").map_err(ser)?;
    let role = UserRole::parse(role_str.as_str()).map_err(ser)?;

    User::new(
        id,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<String, _>("email").map_err(ser)?,
        role,
    )
    .map_err(ser)
}

pub(crate) fn map_training_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<TrainingEvent, StorageError> {
    let event_type_str: String = row.try_get("event_type").map_err(ser)?;
    let event_type = EventType::parse(event_type_str.as_str()).map_err(ser)?;

    Ok(TrainingEvent {
        id: training_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        student_id: user_id_from_str(
            row.try_get::<String, _>("student_id").map_err(ser)?.as_str(),
        )?,
        pi_id: user_id_from_str(row.try_get::<String, _>("pi_id").map_err(ser)?.as_str())?,
        section_id: section_id_from_i64(row.try_get::<i64, _>("section_id").map_err(ser)?)?,
        event_type,
        timestamp: row.try_get("timestamp").map_err(ser)?,
        notes: row.try_get("notes").map_err(ser)?,
    })
}
