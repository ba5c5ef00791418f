// ── Synchronizer ──
//
// Drives fetch → parse → normalize → aggregate on a timer and publishes
// the result. At most one fetch is in flight; a tick that finds one
// running is skipped. A failed cycle keeps the previous snapshot and
// raises the error signal instead.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use unitboard_api::SheetClient;

use crate::aggregate::aggregate;
use crate::config::SyncConfig;
use crate::error::CoreError;
use crate::fetch::SheetFetcher;
use crate::model::Snapshot;
use crate::normalize::Normalizer;
use crate::parse::TableParser;
use crate::store::SnapshotStore;
use crate::stream::SnapshotStream;

// ── SyncPhase ────────────────────────────────────────────────────

/// Scheduler state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Fetching,
}

/// What a single refresh cycle did.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// A new snapshot is now current.
    Published(Arc<Snapshot>),
    /// The cycle failed; the previous snapshot is still current.
    Failed(Arc<CoreError>),
    /// Another fetch was already in flight, or the synchronizer is shut down.
    Skipped,
    /// The fetch finished after shutdown and its result was dropped.
    Discarded,
}

impl RefreshOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published(_))
    }
}

// ── Synchronizer ─────────────────────────────────────────────────

/// Keeps one sheet's snapshot current.
///
/// Cheaply cloneable via `Arc<SyncInner>`. Call [`start()`](Self::start)
/// to fetch immediately and then on every refresh interval, and
/// [`shutdown()`](Self::shutdown) to stop the timer.
pub struct Synchronizer<F: SheetFetcher = SheetClient> {
    inner: Arc<SyncInner<F>>,
}

impl<F: SheetFetcher> Clone for Synchronizer<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SyncInner<F> {
    config: SyncConfig,
    fetcher: F,
    parser: TableParser,
    normalizer: Normalizer,
    store: SnapshotStore,
    phase: watch::Sender<SyncPhase>,
    cancel: CancellationToken,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Synchronizer<SheetClient> {
    /// Build a synchronizer that fetches over HTTP. Does NOT start it.
    pub fn new(config: SyncConfig) -> Result<Self, CoreError> {
        let client = SheetClient::new(config.source.location.clone(), &config.transport())?;
        Ok(Self::with_fetcher(client, config))
    }

    /// Fetch, parse, and aggregate once without starting the timer.
    ///
    /// Used by one-shot consumers that only need a single snapshot.
    pub async fn oneshot(config: SyncConfig) -> Result<Snapshot, CoreError> {
        Self::new(config)?.run_pipeline().await
    }
}

impl<F: SheetFetcher> Synchronizer<F> {
    /// Build a synchronizer around any fetcher.
    pub fn with_fetcher(fetcher: F, config: SyncConfig) -> Self {
        let parser = TableParser::new(config.columns.clone());
        let normalizer = Normalizer::new(config.columns.clone(), config.statuses.clone());
        let (phase, _) = watch::channel(SyncPhase::Idle);

        Self {
            inner: Arc::new(SyncInner {
                config,
                fetcher,
                parser,
                normalizer,
                store: SnapshotStore::new(),
                phase,
                cancel: CancellationToken::new(),
                timer: Mutex::new(None),
            }),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Fire an immediate refresh, then one per refresh interval.
    ///
    /// Calling `start` on a running or shut-down synchronizer does nothing.
    pub async fn start(&self) {
        let mut timer = self.inner.timer.lock().await;
        if timer.is_some() || self.is_shut_down() {
            return;
        }

        let period = self.inner.config.refresh_interval;
        info!(
            source = %self.inner.fetcher.describe(),
            interval_secs = period.as_secs(),
            "starting sheet sync"
        );
        *timer = Some(tokio::spawn(refresh_task(
            self.clone(),
            period,
            self.inner.cancel.clone(),
        )));
    }

    /// Stop the timer and wait for it to exit.
    ///
    /// An in-flight fetch is not aborted, but whatever it returns is
    /// discarded rather than published.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.timer.lock().await.take() {
            let _ = handle.await;
        }
        info!("sheet sync stopped");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Run one refresh cycle now, through the same path a timer tick takes.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        if self.is_shut_down() {
            return RefreshOutcome::Skipped;
        }
        let Some(_guard) = FetchGuard::acquire(&self.inner.phase) else {
            debug!("fetch already in flight, skipping refresh");
            return RefreshOutcome::Skipped;
        };

        let result = self.run_pipeline().await;

        if self.is_shut_down() {
            debug!("discarding refresh result after shutdown");
            return RefreshOutcome::Discarded;
        }

        match result {
            Ok(snapshot) => {
                let snapshot = self.inner.store.publish(snapshot);
                info!(
                    units = snapshot.len(),
                    floors = snapshot.by_floor().len(),
                    discarded_rows = snapshot.discarded_rows(),
                    "snapshot published"
                );
                RefreshOutcome::Published(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "refresh failed, keeping previous snapshot");
                let error = Arc::new(e);
                self.inner.store.fail(Arc::clone(&error));
                RefreshOutcome::Failed(error)
            }
        }
    }

    async fn run_pipeline(&self) -> Result<Snapshot, CoreError> {
        let inner = &self.inner;
        let limit = inner.config.fetch_timeout;

        let payload = tokio::time::timeout(limit, inner.fetcher.fetch())
            .await
            .map_err(|_| CoreError::Timeout {
                timeout_secs: limit.as_secs(),
            })??;
        let fetched_at = Utc::now();
        debug!(bytes = payload.len(), "payload fetched");

        let table = inner.parser.parse(&payload, inner.config.source.format)?;
        let batch = inner.normalizer.normalize_all(&table.rows);
        Ok(aggregate(
            batch.units,
            fetched_at,
            table.dropped + batch.discarded,
        ))
    }

    // ── Read accessors ───────────────────────────────────────────

    /// The current snapshot, `None` until the first successful refresh.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.inner.store.current()
    }

    /// Error from the most recent refresh, cleared by the next success.
    pub fn last_error(&self) -> Option<Arc<CoreError>> {
        self.inner.store.last_error()
    }

    pub fn is_fetching(&self) -> bool {
        *self.inner.phase.borrow() == SyncPhase::Fetching
    }

    /// Observe `Idle` / `Fetching` transitions.
    pub fn phase(&self) -> watch::Receiver<SyncPhase> {
        self.inner.phase.subscribe()
    }

    /// Subscribe to publications and error-signal changes.
    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }
}

// ── In-flight guard ──────────────────────────────────────────────

/// Holds the `Fetching` phase; dropping it returns to `Idle` even if the
/// owning task is cancelled or panics.
struct FetchGuard<'a> {
    phase: &'a watch::Sender<SyncPhase>,
}

impl<'a> FetchGuard<'a> {
    /// Atomic `Idle → Fetching`. `None` if a fetch is already running.
    fn acquire(phase: &'a watch::Sender<SyncPhase>) -> Option<Self> {
        let acquired = phase.send_if_modified(|p| {
            if *p == SyncPhase::Idle {
                *p = SyncPhase::Fetching;
                true
            } else {
                false
            }
        });
        acquired.then_some(Self { phase })
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.phase.send_replace(SyncPhase::Idle);
    }
}

// ── Background task ──────────────────────────────────────────────

/// Tick forever; each tick runs its refresh as a separate task so a slow
/// fetch never delays the timer.
async fn refresh_task<F: SheetFetcher>(
    sync: Synchronizer<F>,
    period: Duration,
    cancel: CancellationToken,
) {
    if period.is_zero() {
        let _ = sync.refresh_now().await;
        return;
    }

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let sync = sync.clone();
                tokio::spawn(async move {
                    let _ = sync.refresh_now().await;
                });
            }
        }
    }
}
