//! The per-import batch orchestrator.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use serptrack_db::{DbError, KeywordRow};
use serptrack_serper::SerperClient;

use crate::extract::extract_records;
use crate::pacer::Pacer;

/// Errors that abort a batch before or outside the per-keyword loop.
///
/// Per-keyword provider and persistence failures are NOT represented here;
/// they become [`KeywordFailure`] entries and the batch continues.
#[derive(Debug, Error)]
pub enum BatchError {
    /// No keywords exist for the requested (import, user) pair. Surfaced
    /// before any provider call is made.
    #[error("no keywords found for this import")]
    NoKeywords,

    /// The keyword fetch itself failed; nothing was processed.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Outcome of one fully processed keyword.
#[derive(Debug, Clone)]
pub struct ProcessedSearchResult {
    pub keyword: String,
    pub keyword_id: Uuid,
    /// Organic entries the provider returned, before the top-10 cap.
    pub total_results: i64,
    /// Rows actually written to the store.
    pub saved_results: i64,
}

/// One keyword that failed, with the failure reason verbatim.
#[derive(Debug, Clone)]
pub struct KeywordFailure {
    pub keyword: String,
    pub error: String,
}

/// Aggregated counts for one batch invocation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total_keywords: i64,
    pub keywords_processed: i64,
    pub keywords_failed: i64,
    pub total_search_results: i64,
    pub total_results_saved: i64,
}

/// Everything a completed batch reports back to the caller.
#[derive(Debug)]
pub struct BatchOutcome {
    pub summary: BatchSummary,
    /// Successful keywords, in the order they were supplied.
    pub processed: Vec<ProcessedSearchResult>,
    /// Failed keywords, in the order they were supplied.
    pub failures: Vec<KeywordFailure>,
}

/// Drives the search-and-persist pipeline across all keywords of one import.
///
/// The provider credential lives inside the injected [`SerperClient`]; the
/// runner never reads process-global state. Keywords are processed strictly
/// sequentially with the [`Pacer`] pause after every one, and a started batch
/// always runs to completion over all keywords — there is no retry, no
/// cancellation, and no early exit on any number of per-keyword failures.
pub struct BatchRunner {
    client: SerperClient,
    pool: PgPool,
    pacer: Pacer,
}

impl BatchRunner {
    #[must_use]
    pub fn new(client: SerperClient, pool: PgPool, pacer: Pacer) -> Self {
        Self {
            client,
            pool,
            pacer,
        }
    }

    /// Fetches the keywords for `(import_id, user_id)` and runs the batch.
    ///
    /// Convenience wrapper around [`BatchRunner::run_keywords`] for callers
    /// that have not already resolved the keyword set.
    ///
    /// # Errors
    ///
    /// - [`BatchError::NoKeywords`] if the (import, user) pair has no
    ///   keywords, before any provider call.
    /// - [`BatchError::Db`] if the keyword fetch fails.
    pub async fn run(&self, import_id: Uuid, user_id: Uuid) -> Result<BatchOutcome, BatchError> {
        let keywords =
            serptrack_db::list_keywords_for_import(&self.pool, import_id, user_id).await?;

        if keywords.is_empty() {
            return Err(BatchError::NoKeywords);
        }

        Ok(self.run_keywords(import_id, &keywords).await)
    }

    /// Runs the batch over an already-resolved keyword set.
    ///
    /// Each keyword yields a `Result<ProcessedSearchResult, KeywordFailure>`
    /// collected into two ordered lists; the summary is aggregated from both
    /// after the loop. Per-keyword failures never fail the batch, so this
    /// always returns a [`BatchOutcome`].
    pub async fn run_keywords(&self, import_id: Uuid, keywords: &[KeywordRow]) -> BatchOutcome {
        tracing::info!(
            import_id = %import_id,
            keyword_count = keywords.len(),
            "starting keyword search batch"
        );

        let mut processed: Vec<ProcessedSearchResult> = Vec::new();
        let mut failures: Vec<KeywordFailure> = Vec::new();

        for keyword in keywords {
            match self.process_keyword(keyword).await {
                Ok(result) => {
                    tracing::info!(
                        keyword = %result.keyword,
                        total_results = result.total_results,
                        saved_results = result.saved_results,
                        "keyword processed"
                    );
                    processed.push(result);
                }
                Err(failure) => {
                    tracing::warn!(
                        keyword = %failure.keyword,
                        error = %failure.error,
                        "keyword failed; continuing batch"
                    );
                    failures.push(failure);
                }
            }

            // Unconditional pause after every keyword, success or failure.
            self.pacer.pause().await;
        }

        let summary = BatchSummary {
            total_keywords: as_count(keywords.len()),
            keywords_processed: as_count(processed.len()),
            keywords_failed: as_count(failures.len()),
            total_search_results: processed.iter().map(|r| r.total_results).sum(),
            total_results_saved: processed.iter().map(|r| r.saved_results).sum(),
        };

        tracing::info!(
            import_id = %import_id,
            processed = summary.keywords_processed,
            failed = summary.keywords_failed,
            saved = summary.total_results_saved,
            "keyword search batch finished"
        );

        BatchOutcome {
            summary,
            processed,
            failures,
        }
    }

    /// Search, extract, persist for one keyword.
    ///
    /// Every failure mode collapses into a [`KeywordFailure`] carrying the
    /// error message verbatim, so the loop never needs to distinguish
    /// provider failures from persistence failures.
    async fn process_keyword(
        &self,
        keyword: &KeywordRow,
    ) -> Result<ProcessedSearchResult, KeywordFailure> {
        let fail = |error: String| KeywordFailure {
            keyword: keyword.keyword.clone(),
            error,
        };

        let response = self
            .client
            .search(&keyword.keyword)
            .await
            .map_err(|e| fail(e.to_string()))?;

        let total_results = as_count(response.organic.len());
        let records = extract_records(
            &response,
            &keyword.keyword,
            keyword.user_id,
            keyword.import_id,
        );

        let saved = serptrack_db::insert_search_results(&self.pool, &records)
            .await
            .map_err(|e| fail(e.to_string()))?;

        Ok(ProcessedSearchResult {
            keyword: keyword.keyword.clone(),
            keyword_id: keyword.id,
            total_results,
            saved_results: i64::try_from(saved).unwrap_or(i64::MAX),
        })
    }
}

fn as_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn organic_body(count: usize) -> serde_json::Value {
        let organic: Vec<serde_json::Value> = (1..=count)
            .map(|p| {
                serde_json::json!({
                    "link": format!("https://example.com/{p}"),
                    "position": p
                })
            })
            .collect();
        serde_json::json!({ "organic": organic, "credits": 1 })
    }

    async fn mock_keyword(server: &MockServer, keyword: &str, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(serde_json::json!({ "q": keyword })))
            .respond_with(template)
            .mount(server)
            .await;
    }

    fn test_runner(pool: PgPool, base_url: &str) -> BatchRunner {
        let client = SerperClient::with_base_url("test-key", 30, base_url)
            .expect("client construction should not fail");
        BatchRunner::new(client, pool, Pacer::from_millis(0))
    }

    async fn seed_import(pool: &PgPool, user_id: Uuid) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO imports (user_id, file_name, keyword_count) \
             VALUES ($1, 'keywords.csv', 0) RETURNING id",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("seed_import failed")
    }

    async fn seed_keyword(pool: &PgPool, import_id: Uuid, user_id: Uuid, keyword: &str) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO keywords (keyword, user_id, import_id, file_name) \
             VALUES ($1, $2, $3, 'keywords.csv') RETURNING id",
        )
        .bind(keyword)
        .bind(user_id)
        .bind(import_id)
        .fetch_one(pool)
        .await
        .expect("seed_keyword failed")
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn all_success_summary_caps_saved_results_at_ten(pool: PgPool) {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();
        let import_id = seed_import(&pool, user_id).await;
        seed_keyword(&pool, import_id, user_id, "shoes").await;
        seed_keyword(&pool, import_id, user_id, "boots").await;

        mock_keyword(
            &server,
            "shoes",
            ResponseTemplate::new(200).set_body_json(organic_body(12)),
        )
        .await;
        mock_keyword(
            &server,
            "boots",
            ResponseTemplate::new(200).set_body_json(organic_body(3)),
        )
        .await;

        let outcome = test_runner(pool.clone(), &server.uri())
            .run(import_id, user_id)
            .await
            .expect("batch should complete");

        assert_eq!(
            outcome.summary,
            BatchSummary {
                total_keywords: 2,
                keywords_processed: 2,
                keywords_failed: 0,
                total_search_results: 15,
                total_results_saved: 13,
            }
        );
        assert!(outcome.failures.is_empty());

        let stored = serptrack_db::list_search_results_for_import(&pool, import_id, user_id)
            .await
            .expect("list");
        assert_eq!(stored.len(), 13);
        let shoes = stored.iter().filter(|r| r.query == "shoes").count();
        assert_eq!(shoes, 10, "shoes results should be capped at 10");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn one_provider_failure_does_not_abort_the_batch(pool: PgPool) {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();
        let import_id = seed_import(&pool, user_id).await;
        seed_keyword(&pool, import_id, user_id, "shoes").await;
        seed_keyword(&pool, import_id, user_id, "broken").await;
        seed_keyword(&pool, import_id, user_id, "boots").await;

        mock_keyword(
            &server,
            "shoes",
            ResponseTemplate::new(200).set_body_json(organic_body(2)),
        )
        .await;
        mock_keyword(&server, "broken", ResponseTemplate::new(500)).await;
        mock_keyword(
            &server,
            "boots",
            ResponseTemplate::new(200).set_body_json(organic_body(1)),
        )
        .await;

        let outcome = test_runner(pool, &server.uri())
            .run(import_id, user_id)
            .await
            .expect("batch should still complete");

        assert_eq!(outcome.summary.keywords_processed, 2);
        assert_eq!(outcome.summary.keywords_failed, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].keyword, "broken");
        assert!(outcome.failures[0].error.contains("500"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn forbidden_keyword_reports_403_verbatim(pool: PgPool) {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();
        let import_id = seed_import(&pool, user_id).await;
        seed_keyword(&pool, import_id, user_id, "blocked").await;

        mock_keyword(&server, "blocked", ResponseTemplate::new(403)).await;

        let outcome = test_runner(pool, &server.uri())
            .run(import_id, user_id)
            .await
            .expect("partial failure is not a batch failure");

        assert_eq!(outcome.summary.keywords_processed, 0);
        assert_eq!(outcome.summary.keywords_failed, 1);
        assert!(outcome.failures[0].error.contains("403"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn empty_keyword_set_fails_before_any_provider_call(pool: PgPool) {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();
        let import_id = seed_import(&pool, user_id).await;

        let result = test_runner(pool, &server.uri())
            .run(import_id, user_id)
            .await;

        assert!(matches!(result, Err(BatchError::NoKeywords)));
        assert!(
            server.received_requests().await.unwrap_or_default().is_empty(),
            "no provider call may be made for an empty keyword set"
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn other_users_keywords_are_not_processed(pool: PgPool) {
        let server = MockServer::start().await;
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let import_id = seed_import(&pool, owner).await;
        seed_keyword(&pool, import_id, owner, "shoes").await;

        let result = test_runner(pool, &server.uri()).run(import_id, other).await;

        assert!(
            matches!(result, Err(BatchError::NoKeywords)),
            "a different user must see an empty keyword set"
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn outcomes_preserve_keyword_supply_order(pool: PgPool) {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();
        let import_id = seed_import(&pool, user_id).await;
        for (i, kw) in ["alpha", "bravo", "charlie"].into_iter().enumerate() {
            // Explicit timestamps so supply order is unambiguous even when
            // the inserts land within the same clock tick.
            sqlx::query(
                "INSERT INTO keywords (keyword, user_id, import_id, file_name, created_at) \
                 VALUES ($1, $2, $3, 'keywords.csv', NOW() + make_interval(secs => $4))",
            )
            .bind(kw)
            .bind(user_id)
            .bind(import_id)
            .bind(f64::from(u8::try_from(i).expect("small index")))
            .execute(&pool)
            .await
            .expect("seed ordered keyword");
            mock_keyword(
                &server,
                kw,
                ResponseTemplate::new(200).set_body_json(organic_body(1)),
            )
            .await;
        }

        let outcome = test_runner(pool, &server.uri())
            .run(import_id, user_id)
            .await
            .expect("batch should complete");

        let order: Vec<&str> = outcome.processed.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(order, vec!["alpha", "bravo", "charlie"]);
    }
}
