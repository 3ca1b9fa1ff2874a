//! Read endpoints for imports, keywords, and stored search results.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::AuthUser;

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct ImportsResponse {
    success: bool,
    imports: Vec<ImportItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportItem {
    id: Uuid,
    file_name: String,
    keyword_count: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct KeywordsResponse {
    success: bool,
    keywords: Vec<KeywordItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KeywordItem {
    id: Uuid,
    keyword: String,
    file_name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ResultsResponse {
    success: bool,
    results: Vec<SearchResultItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultItem {
    query: String,
    position: i32,
    link: String,
    created_at: DateTime<Utc>,
}

/// Lists the calling user's imports, newest first.
pub(super) async fn list_imports(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ImportsResponse>, ApiError> {
    let rows = serptrack_db::list_imports_for_user(&state.pool, user.0)
        .await
        .map_err(|e| map_db_error(&e))?;

    let imports = rows
        .into_iter()
        .map(|row| ImportItem {
            id: row.id,
            file_name: row.file_name,
            keyword_count: row.keyword_count,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ImportsResponse {
        success: true,
        imports,
    }))
}

/// Lists the keywords under one of the calling user's imports.
pub(super) async fn list_import_keywords(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(import_id): Path<Uuid>,
) -> Result<Json<KeywordsResponse>, ApiError> {
    let rows = serptrack_db::list_keywords_for_import(&state.pool, import_id, user.0)
        .await
        .map_err(|e| map_db_error(&e))?;

    let keywords = rows
        .into_iter()
        .map(|row| KeywordItem {
            id: row.id,
            keyword: row.keyword,
            file_name: row.file_name,
        })
        .collect();

    Ok(Json(KeywordsResponse {
        success: true,
        keywords,
    }))
}

/// Lists stored search results for one of the calling user's imports,
/// keyword ascending then rank ascending, ready for grouped display.
pub(super) async fn list_import_results(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(import_id): Path<Uuid>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let rows = serptrack_db::list_search_results_for_import(&state.pool, import_id, user.0)
        .await
        .map_err(|e| map_db_error(&e))?;

    let results = rows
        .into_iter()
        .map(|row| SearchResultItem {
            query: row.query,
            position: row.position,
            link: row.link,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ResultsResponse {
        success: true,
        results,
    }))
}
