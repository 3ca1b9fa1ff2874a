//! HTTP client for the Serper.dev Google-search API.

mod client;
mod error;
mod types;

pub use client::SerperClient;
pub use error::SerperError;
pub use types::{OrganicResult, SerperResponse};
