//! Database operations for the `imports` table.
//!
//! Imports are created by the CSV upload flow; this crate only reads them.
//! All queries filter by `user_id` so one user can never see another's
//! imports.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `imports` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub keyword_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Returns a single import by id, scoped to the owning user, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_import(
    pool: &PgPool,
    import_id: Uuid,
    user_id: Uuid,
) -> Result<Option<ImportRow>, DbError> {
    let row = sqlx::query_as::<_, ImportRow>(
        "SELECT id, user_id, file_name, keyword_count, created_at \
         FROM imports \
         WHERE id = $1 AND user_id = $2",
    )
    .bind(import_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all imports owned by a user, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_imports_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<ImportRow>, DbError> {
    let rows = sqlx::query_as::<_, ImportRow>(
        "SELECT id, user_id, file_name, keyword_count, created_at \
         FROM imports \
         WHERE user_id = $1 \
         ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
