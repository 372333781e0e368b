use thiserror::Error;

/// Errors returned by the Supabase REST client.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; `message` is PostgREST's error message when the body has one.
    #[error("Supabase API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A filtered update matched no row.
    #[error("no product row with id {id}")]
    RowNotFound { id: String },

    #[error("invalid project URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
