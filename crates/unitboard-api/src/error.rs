use thiserror::Error;

/// Top-level error type for the `unitboard-api` crate.
///
/// Every way a single fetch of the source sheet can fail. The fetcher
/// never retries on its own; `unitboard-core` decides what a failure
/// means for the published snapshot.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    ///
    /// `url` is the display form of the source; the request URL may
    /// carry an API key and never appears in errors.
    #[error("HTTP transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup error while building the HTTP client.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Response ────────────────────────────────────────────────────
    /// The source answered with a non-success status code.
    #[error("Source returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The source answered 2xx but the body was empty or whitespace.
    #[error("Source returned an empty body for {url}")]
    EmptyBody { url: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on
    /// the next scheduled tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
