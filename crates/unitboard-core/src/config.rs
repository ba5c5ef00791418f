// ── Runtime sync configuration ──
//
// These types describe *where* the sheet lives and *how often* to pull
// it. They carry the API key and vocabulary extensions, but never touch
// disk. The CLI (or any other consumer) builds a `SyncConfig` and hands
// it to the `Synchronizer`.

use std::path::PathBuf;
use std::time::Duration;

use unitboard_api::{SourceLocation, TlsMode, TransportConfig};

use crate::model::BookedPolicy;
use crate::parse::SourceFormat;
use crate::vocabulary::{ColumnAliases, StatusVocabulary};

/// Default period between scheduled refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Default bound on a single fetch, end to end.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed mirrors).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// The sheet to pull and the payload shape to expect from it.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub location: SourceLocation,
    pub format: SourceFormat,
}

impl SourceConfig {
    pub fn new(location: SourceLocation) -> Self {
        Self {
            location,
            format: SourceFormat::Auto,
        }
    }
}

/// Configuration for one synchronized sheet.
///
/// Built by consumers, passed to the `Synchronizer`; core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub source: SourceConfig,
    /// TLS verification strategy for the HTTP client.
    pub tls: TlsVerification,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Period between scheduled refreshes. Zero means fetch once on start.
    pub refresh_interval: Duration,
    /// Upper bound on one fetch; a hung call fails the cycle after this.
    pub fetch_timeout: Duration,
    /// How consumers should present `Booked` in counts.
    pub booked_policy: BookedPolicy,
    /// Header aliases, defaults plus configured extensions.
    pub columns: ColumnAliases,
    /// Status aliases, defaults plus configured extensions.
    pub statuses: StatusVocabulary,
}

impl SyncConfig {
    /// Defaults for everything except the source.
    pub fn new(source: SourceConfig) -> Self {
        Self {
            source,
            tls: TlsVerification::default(),
            request_timeout: DEFAULT_FETCH_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            booked_policy: BookedPolicy::default(),
            columns: ColumnAliases::default(),
            statuses: StatusVocabulary::default(),
        }
    }

    /// Transport settings for the fetcher's HTTP client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.request_timeout,
        }
    }
}
