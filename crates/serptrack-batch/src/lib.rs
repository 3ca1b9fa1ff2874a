//! The keyword-search batch pipeline.
//!
//! Drives one import's keywords through the Serper client, extracts the top
//! organic results, persists them, and aggregates per-keyword outcomes into
//! a batch summary. Keywords are processed strictly one at a time with a
//! fixed pause between requests; per-keyword failures never abort the batch.

mod extract;
mod pacer;
mod runner;

pub use extract::extract_records;
pub use pacer::Pacer;
pub use runner::{
    BatchError, BatchOutcome, BatchRunner, BatchSummary, KeywordFailure, ProcessedSearchResult,
};
