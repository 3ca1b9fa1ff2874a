//! Extraction of storage-ready records from a Serper response.

use serptrack_db::NewSearchResult;
use serptrack_serper::SerperResponse;
use uuid::Uuid;

/// Maximum organic entries kept per keyword; the rest are discarded.
pub(crate) const MAX_RESULTS_PER_KEYWORD: usize = 10;

/// Maps a provider response to storage-ready records for one keyword.
///
/// Takes at most the first `MAX_RESULTS_PER_KEYWORD` entries of `organic`
/// in upstream order (the provider is assumed rank-ordered, so entries are
/// neither re-sorted nor renumbered — `position` is copied verbatim). An
/// absent or empty `organic` yields an empty vec. Pure: no I/O, cannot fail.
#[must_use]
pub fn extract_records(
    response: &SerperResponse,
    keyword: &str,
    user_id: Uuid,
    import_id: Uuid,
) -> Vec<NewSearchResult> {
    response
        .organic
        .iter()
        .take(MAX_RESULTS_PER_KEYWORD)
        .map(|entry| NewSearchResult {
            query: keyword.to_owned(),
            position: entry.position,
            link: entry.link.clone(),
            user_id,
            import_id,
        })
        .collect()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
