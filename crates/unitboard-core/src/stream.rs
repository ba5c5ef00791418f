// ── Reactive snapshot stream ──
//
// Subscription type for consuming publications and error-signal changes
// from the synchronizer.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::error::CoreError;
use crate::model::Snapshot;

/// What a subscriber sees after each store write.
#[derive(Debug, Clone, Default)]
pub struct SyncUpdate {
    /// Monotonic write counter; `0` before the first refresh completes.
    pub version: u64,
    /// Last successfully published snapshot.
    pub snapshot: Option<Arc<Snapshot>>,
    /// Error from the most recent refresh, cleared by the next success.
    pub error: Option<Arc<CoreError>>,
}

/// A subscription to the synchronizer's published state.
///
/// Provides both point-in-time access and change notification via
/// [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct SnapshotStream {
    current: SyncUpdate,
    receiver: watch::Receiver<SyncUpdate>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: watch::Receiver<SyncUpdate>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// State captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &SyncUpdate {
        &self.current
    }

    /// Latest state, which may be newer than [`current()`](Self::current).
    pub fn latest(&self) -> SyncUpdate {
        self.receiver.borrow().clone()
    }

    /// Wait for the next publication or error change.
    /// Returns `None` once the synchronizer has been dropped.
    pub async fn changed(&mut self) -> Option<SyncUpdate> {
        self.receiver.changed().await.ok()?;
        let update = self.receiver.borrow_and_update().clone();
        self.current = update.clone();
        Some(update)
    }

    /// Convert into a `Stream`. The first item is the state at conversion.
    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct SnapshotWatchStream {
    inner: WatchStream<SyncUpdate>,
}

impl Stream for SnapshotWatchStream {
    type Item = SyncUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream boxes its future, so it is Unpin.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn changed_returns_new_state() {
        let (tx, rx) = watch::channel(SyncUpdate::default());
        let mut stream = SnapshotStream::new(rx);
        assert_eq!(stream.current().version, 0);

        tx.send_modify(|u| u.version = 1);
        let update = stream.changed().await.unwrap();
        assert_eq!(update.version, 1);
        assert_eq!(stream.current().version, 1);
    }

    #[tokio::test]
    async fn changed_ends_when_sender_drops() {
        let (tx, rx) = watch::channel(SyncUpdate::default());
        let mut stream = SnapshotStream::new(rx);
        drop(tx);
        assert!(stream.changed().await.is_none());
    }

    #[tokio::test]
    async fn into_stream_yields_current_then_changes() {
        let (tx, rx) = watch::channel(SyncUpdate::default());
        let mut stream = SnapshotStream::new(rx).into_stream();

        assert_eq!(stream.next().await.unwrap().version, 0);
        tx.send_modify(|u| u.version = 5);
        assert_eq!(stream.next().await.unwrap().version, 5);
        drop(tx);
        assert!(stream.next().await.is_none());
    }
}
