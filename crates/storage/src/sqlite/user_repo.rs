use track_core::model::{User, UserId, UserRole};

use super::{SqliteRepository, mapping};
use crate::repository::{StorageError, UserRepository};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO users (id, name, email, role)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                role = excluded.role
            ",
        )
        .bind(mapping::user_id_to_string(user.id()))
        .bind(user.name().to_owned())
        .bind(user.email().to_owned())
        .bind(user.role().as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict),
            Err(err) => Err(StorageError::Connection(err.to_string())),
        }
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, email, role
            FROM users
            WHERE id = ?1
            ",
        )
        .bind(mapping::user_id_to_string(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(mapping::map_user_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, email, role
            FROM users
            WHERE email = ?1
            ",
        )
        .bind(email.to_owned())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(mapping::map_user_row).transpose()
    }

    async fn list_users(&self, limit: u32) -> Result<Vec<User>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, email, role
            FROM users
            ORDER BY name ASC, email ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(mapping::map_user_row(&row)?);
        }
        Ok(users)
    }

    async fn update_role(&self, id: UserId, role: UserRole) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            UPDATE users SET role = ?2 WHERE id = ?1
            ",
        )
        .bind(mapping::user_id_to_string(id))
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
