use thiserror::Error;

/// Errors returned by the Serper.dev API client.
#[derive(Debug, Error)]
pub enum SerperError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status for a keyword search.
    #[error("Serper API error for keyword \"{keyword}\": HTTP {status}")]
    Status { status: u16, keyword: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
