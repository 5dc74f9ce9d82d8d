use track_core::model::{Section, SectionId};

use super::{SqliteRepository, mapping};
use crate::repository::{SectionRepository, StorageError};

#[async_trait::async_trait]
impl SectionRepository for SqliteRepository {
    async fn upsert_section(&self, section: &Section) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO sections (id, name, prereq, active)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                prereq = excluded.prereq,
                active = excluded.active
            ",
        )
        .bind(mapping::section_id_to_i64(section.id())?)
        .bind(section.name().to_owned())
        .bind(
            section
                .prerequisite()
                .map(mapping::section_id_to_i64)
                .transpose()?,
        )
        .bind(i64::from(section.is_active()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_section(&self, id: SectionId) -> Result<Option<Section>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, prereq, active
            FROM sections
            WHERE id = ?1
            ",
        )
        .bind(mapping::section_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(mapping::map_section_row).transpose()
    }

    async fn list_sections(&self, only_active: bool) -> Result<Vec<Section>, StorageError> {
        let sql = if only_active {
            r"
            SELECT id, name, prereq, active
            FROM sections
            WHERE active = 1
            ORDER BY id ASC
            "
        } else {
            r"
            SELECT id, name, prereq, active
            FROM sections
            ORDER BY id ASC
            "
        };

        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut sections = Vec::with_capacity(rows.len());
        for row in rows {
            sections.push(mapping::map_section_row(&row)?);
        }
        Ok(sections)
    }
}
