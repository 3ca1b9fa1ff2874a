//! Database operations for the `search_results` table.
//!
//! Rows are written exclusively by the batch pipeline, one bulk insert per
//! keyword. There is no uniqueness constraint: re-running a batch for the
//! same import appends duplicate rows rather than upserting, and callers
//! must not assume re-run safety.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::DbError;

/// A storage-ready search result produced by the extractor, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSearchResult {
    /// The originating keyword text.
    pub query: String,
    /// 1-based rank position, copied verbatim from the provider.
    pub position: i32,
    pub link: String,
    pub user_id: Uuid,
    pub import_id: Uuid,
}

/// A row from the `search_results` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchResultRow {
    pub id: Uuid,
    pub query: String,
    pub position: i32,
    pub link: String,
    pub user_id: Uuid,
    pub import_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Writes a batch of search results in a single multi-row insert.
///
/// Returns the number of rows written. An empty slice returns 0 without
/// touching the database. The insert is one statement, so it is atomic for
/// this keyword's record set but independent of any other keyword's.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_search_results(
    pool: &PgPool,
    records: &[NewSearchResult],
) -> Result<u64, DbError> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::new(
        "INSERT INTO search_results (query, position, link, user_id, import_id) ",
    );
    builder.push_values(records, |mut b, record| {
        b.push_bind(&record.query)
            .push_bind(record.position)
            .push_bind(&record.link)
            .push_bind(record.user_id)
            .push_bind(record.import_id);
    });

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// Returns all stored results for an import owned by a user, grouped for
/// display: keyword text ascending, then rank position ascending.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_search_results_for_import(
    pool: &PgPool,
    import_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<SearchResultRow>, DbError> {
    let rows = sqlx::query_as::<_, SearchResultRow>(
        "SELECT id, query, position, link, user_id, import_id, created_at \
         FROM search_results \
         WHERE import_id = $1 AND user_id = $2 \
         ORDER BY query ASC, position ASC",
    )
    .bind(import_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
