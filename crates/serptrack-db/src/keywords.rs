//! Database operations for the `keywords` table.
//!
//! Keywords are created in bulk at upload time and never mutated here. The
//! batch pipeline reads them scoped to `(import_id, user_id)`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `keywords` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeywordRow {
    pub id: Uuid,
    pub keyword: String,
    pub user_id: Uuid,
    pub import_id: Uuid,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

/// Returns all keywords for an import owned by a user, in insertion order.
///
/// An empty vec means the import has no keywords for that user (or does not
/// exist — the two cases are indistinguishable by design, so callers treat
/// both as not-found).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_keywords_for_import(
    pool: &PgPool,
    import_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<KeywordRow>, DbError> {
    let rows = sqlx::query_as::<_, KeywordRow>(
        "SELECT id, keyword, user_id, import_id, file_name, created_at \
         FROM keywords \
         WHERE import_id = $1 AND user_id = $2 \
         ORDER BY created_at, id",
    )
    .bind(import_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
