use track_core::model::{TrainingEvent, TrainingId, UserId, ValidatedTraining};

use super::{SqliteRepository, mapping};
use crate::repository::{StorageError, TrainingRepository};

#[async_trait::async_trait]
impl TrainingRepository for SqliteRepository {
    async fn insert_training(
        &self,
        training: &ValidatedTraining,
    ) -> Result<TrainingId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO trainings (student_id, pi_id, section_id, event_type, timestamp, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(mapping::user_id_to_string(training.student_id))
        .bind(mapping::user_id_to_string(training.pi_id))
        .bind(mapping::section_id_to_i64(training.section_id)?)
        .bind(training.event_type.as_str())
        .bind(training.timestamp)
        .bind(training.notes.clone())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        mapping::training_id_from_i64(result.last_insert_rowid())
    }

    async fn update_training(&self, event: &TrainingEvent) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            UPDATE trainings SET
                student_id = ?2,
                pi_id = ?3,
                section_id = ?4,
                event_type = ?5,
                timestamp = ?6,
                notes = ?7
            WHERE id = ?1
            ",
        )
        .bind(mapping::training_id_to_i64(event.id)?)
        .bind(mapping::user_id_to_string(event.student_id))
        .bind(mapping::user_id_to_string(event.pi_id))
        .bind(mapping::section_id_to_i64(event.section_id)?)
        .bind(event.event_type.as_str())
        .bind(event.timestamp)
        .bind(event.notes.clone())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_training(&self, id: TrainingId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM trainings WHERE id = ?1")
            .bind(mapping::training_id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_training(&self, id: TrainingId) -> Result<Option<TrainingEvent>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, student_id, pi_id, section_id, event_type, timestamp, notes
            FROM trainings
            WHERE id = ?1
            ",
        )
        .bind(mapping::training_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(mapping::map_training_row).transpose()
    }

    async fn trainings_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<TrainingEvent>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, student_id, pi_id, section_id, event_type, timestamp, notes
            FROM trainings
            WHERE student_id = ?1
            ORDER BY timestamp ASC, id ASC
            ",
        )
        .bind(mapping::user_id_to_string(student_id))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(mapping::map_training_row(&row)?);
        }
        Ok(events)
    }

    async fn recent_trainings_for_pi(
        &self,
        pi_id: UserId,
        limit: u32,
    ) -> Result<Vec<TrainingEvent>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, student_id, pi_id, section_id, event_type, timestamp, notes
            FROM trainings
            WHERE pi_id = ?1
            ORDER BY timestamp DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(mapping::user_id_to_string(pi_id))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(mapping::map_training_row(&row)?);
        }
        Ok(events)
    }
}
