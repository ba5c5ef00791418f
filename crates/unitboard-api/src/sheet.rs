// Sheet export HTTP client
//
// One GET per call, with every cache along the way told to stay out of
// it. Returns the body as text; deciding whether the text is CSV or a
// JSON table is the parser's job, not ours.

use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use tracing::debug;

use crate::error::Error;
use crate::source::SourceLocation;
use crate::transport::TransportConfig;

/// Raw HTTP client for a published spreadsheet export.
///
/// Stateless between calls: no retry, no caching, no cookie jar.
pub struct SheetClient {
    http: reqwest::Client,
    source: SourceLocation,
    timeout_secs: u64,
}

impl SheetClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(source: SourceLocation, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            source,
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// The client's own timeout is unknown here, so timeouts report `0s`.
    pub fn with_client(http: reqwest::Client, source: SourceLocation) -> Self {
        Self {
            http,
            source,
            timeout_secs: 0,
        }
    }

    /// The configured source.
    pub fn source(&self) -> &SourceLocation {
        &self.source
    }

    /// Fetch the current payload as text.
    ///
    /// Fails on transport errors, non-2xx responses, and empty bodies.
    pub async fn fetch_text(&self) -> Result<String, Error> {
        let display_url = self.source.display_url().to_string();
        debug!(url = %display_url, "GET sheet export");

        let resp = self
            .http
            .get(self.source.request_url())
            .headers(no_cache_headers())
            .send()
            .await
            .map_err(|e| self.map_transport(e, &display_url))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: display_url,
            });
        }

        let body = resp.text().await.map_err(|e| self.map_transport(e, &display_url))?;
        if body.trim().is_empty() {
            return Err(Error::EmptyBody { url: display_url });
        }

        debug!(bytes = body.len(), "sheet export received");
        Ok(body)
    }

    fn map_transport(&self, err: reqwest::Error, display: &str) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport {
                url: display.to_owned(),
                source: err.without_url(),
            }
        }
    }
}

fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, max-age=0"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}
