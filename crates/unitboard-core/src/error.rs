// ── Core error types ──
//
// The single error signal a refresh cycle can raise. Transport errors
// from `unitboard-api` are translated into source-level variants so
// consumers never match on reqwest types. Per-row discards are not
// errors and never show up here.

use thiserror::Error;

use crate::parse::ParseError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Fetch errors ─────────────────────────────────────────────────
    #[error("Cannot reach source at {url}: {reason}")]
    SourceUnreachable { url: String, reason: String },

    #[error("Source responded with HTTP {status}")]
    SourceStatus { status: u16 },

    #[error("Source returned an empty payload")]
    EmptyPayload,

    #[error("Fetch timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Payload errors ───────────────────────────────────────────────
    #[error("Malformed payload: {0}")]
    Parse(#[from] ParseError),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// `true` for failures the next tick may well not hit again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::SourceUnreachable { .. } | Self::Timeout { .. } => true,
            Self::SourceStatus { status } => *status == 429 || *status >= 500,
            Self::EmptyPayload | Self::Parse(_) | Self::Config { .. } => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<unitboard_api::Error> for CoreError {
    fn from(err: unitboard_api::Error) -> Self {
        match err {
            unitboard_api::Error::Transport { url, source } => {
                if source.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if let Some(status) = source.status() {
                    CoreError::SourceStatus {
                        status: status.as_u16(),
                    }
                } else {
                    CoreError::SourceUnreachable {
                        url,
                        reason: source.to_string(),
                    }
                }
            }
            unitboard_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid source URL: {e}"),
            },
            unitboard_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            // Only raised while building the client, before any request
            unitboard_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS setup failed: {msg}"),
            },
            unitboard_api::Error::Status { status, .. } => CoreError::SourceStatus { status },
            unitboard_api::Error::EmptyBody { .. } => CoreError::EmptyPayload,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use unitboard_api::{SheetClient, SourceLocation, TransportConfig};

    use super::*;

    #[test]
    fn status_errors_keep_the_code() {
        let err = CoreError::from(unitboard_api::Error::Status {
            status: 503,
            url: "https://example.com/sheet".into(),
        });
        assert!(matches!(err, CoreError::SourceStatus { status: 503 }));
        assert!(err.is_transient());
    }

    #[test]
    fn empty_body_maps_to_empty_payload() {
        let err = CoreError::from(unitboard_api::Error::EmptyBody {
            url: "https://example.com/sheet".into(),
        });
        assert!(matches!(err, CoreError::EmptyPayload));
        assert!(!err.is_transient());
    }

    #[test]
    fn api_timeout_keeps_duration() {
        let err = CoreError::from(unitboard_api::Error::Timeout { timeout_secs: 15 });
        assert_eq!(err.to_string(), "Fetch timed out after 15s");
    }

    #[test]
    fn tls_setup_failure_is_a_config_error() {
        let err = CoreError::from(unitboard_api::Error::Tls("invalid CA cert".into()));
        assert!(matches!(err, CoreError::Config { ref message } if message.contains("invalid CA cert")));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn unreachable_source_names_the_display_url() {
        let source = SourceLocation::parse("http://127.0.0.1:9/units.csv").unwrap();
        let transport = TransportConfig {
            timeout: Duration::from_secs(2),
            ..TransportConfig::default()
        };
        let client = SheetClient::new(source, &transport).unwrap();

        let err = CoreError::from(client.fetch_text().await.unwrap_err());
        match err {
            CoreError::SourceUnreachable { ref url, .. } => {
                assert_eq!(url, "http://127.0.0.1:9/units.csv");
            }
            other => panic!("expected SourceUnreachable, got: {other:?}"),
        }
        assert!(err.to_string().contains("127.0.0.1:9/units.csv"));
    }

    #[test]
    fn parse_errors_convert() {
        let err: CoreError = ParseError::Empty.into();
        assert!(matches!(err, CoreError::Parse(ParseError::Empty)));
    }
}
