//! The batch-trigger endpoint: `POST /api/v1/search-keywords/{import_id}`.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use serptrack_batch::{BatchOutcome, BatchRunner, Pacer};
use serptrack_serper::SerperClient;

use crate::middleware::{AuthUser, RequestId};

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchKeywordsResponse {
    success: bool,
    import_id: Uuid,
    summary: SummaryBody,
    processed_results: Vec<ProcessedResultBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<KeywordErrorBody>>,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryBody {
    total_keywords: i64,
    keywords_processed: i64,
    keywords_failed: i64,
    total_search_results: i64,
    total_results_saved: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessedResultBody {
    keyword: String,
    keyword_id: Uuid,
    total_results: i64,
    saved_results: i64,
}

#[derive(Debug, Serialize)]
struct KeywordErrorBody {
    keyword: String,
    error: String,
}

/// Runs the keyword search batch for one import owned by the calling user.
///
/// Precondition checks, in order: the keyword set must be non-empty (404
/// before any provider call) and a Serper credential must be configured
/// (500 configuration error). Per-keyword failures are reported in the 200
/// body, never as a request-level failure.
pub(super) async fn search_keywords(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(req_id): Extension<RequestId>,
    Path(import_id): Path<Uuid>,
) -> Result<Json<SearchKeywordsResponse>, ApiError> {
    let keywords = serptrack_db::list_keywords_for_import(&state.pool, import_id, user.0)
        .await
        .map_err(|e| map_db_error(&e))?;

    if keywords.is_empty() {
        return Err(ApiError::not_found("no keywords found for this import"));
    }

    let Some(api_key) = state.config.serper_api_key.as_deref() else {
        tracing::error!(
            request_id = %req_id.0,
            "SERPTRACK_SERPER_API_KEY is not configured; cannot run batch"
        );
        return Err(ApiError::internal("search API configuration error"));
    };

    let client = match state.config.serper_base_url.as_deref() {
        Some(base_url) => {
            SerperClient::with_base_url(api_key, state.config.serper_timeout_secs, base_url)
        }
        None => SerperClient::new(api_key, state.config.serper_timeout_secs),
    }
    .map_err(|e| {
        tracing::error!(error = %e, "failed to construct serper client");
        ApiError::internal("internal server error").with_details(e.to_string())
    })?;

    let runner = BatchRunner::new(
        client,
        state.pool.clone(),
        Pacer::from_millis(state.config.batch_delay_ms),
    );
    let outcome = runner.run_keywords(import_id, &keywords).await;

    Ok(Json(into_response(import_id, outcome)))
}

fn into_response(import_id: Uuid, outcome: BatchOutcome) -> SearchKeywordsResponse {
    let message = format!(
        "Successfully processed {} out of {} keywords",
        outcome.summary.keywords_processed, outcome.summary.total_keywords
    );

    let errors = if outcome.failures.is_empty() {
        None
    } else {
        Some(
            outcome
                .failures
                .into_iter()
                .map(|f| KeywordErrorBody {
                    keyword: f.keyword,
                    error: f.error,
                })
                .collect(),
        )
    };

    SearchKeywordsResponse {
        success: true,
        import_id,
        summary: SummaryBody {
            total_keywords: outcome.summary.total_keywords,
            keywords_processed: outcome.summary.keywords_processed,
            keywords_failed: outcome.summary.keywords_failed,
            total_search_results: outcome.summary.total_search_results,
            total_results_saved: outcome.summary.total_results_saved,
        },
        processed_results: outcome
            .processed
            .into_iter()
            .map(|r| ProcessedResultBody {
                keyword: r.keyword,
                keyword_id: r.keyword_id,
                total_results: r.total_results,
                saved_results: r.saved_results,
            })
            .collect(),
        errors,
        message,
    }
}
