use thiserror::Error;

/// Errors returned by the Polar API client.
#[derive(Debug, Error)]
pub enum PolarError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. Covers 401/403 for a bad or under-scoped token.
    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus { status: u16, url: String, body: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination limit reached: exceeded {max_pages} pages")]
    PaginationLimit { max_pages: u32 },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
