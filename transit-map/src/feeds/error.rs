//! Feed client error types.

/// Errors from the feed HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed.
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// The feed returned an error status code.
    #[error("feed error {status}: {message}")]
    Api { status: u16, message: String },
}
