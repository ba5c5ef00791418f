// ── Snapshot store ──
//
// Holds the one current snapshot plus the last refresh error. Reads are
// lock-free `ArcSwap` loads; every write replaces a whole value and then
// notifies subscribers through a `watch` channel.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::watch;

use crate::error::CoreError;
use crate::model::Snapshot;
use crate::stream::{SnapshotStream, SyncUpdate};

pub(crate) struct SnapshotStore {
    current: ArcSwapOption<Snapshot>,
    last_error: ArcSwapOption<CoreError>,
    updates: watch::Sender<SyncUpdate>,
}

impl SnapshotStore {
    pub(crate) fn new() -> Self {
        let (updates, _) = watch::channel(SyncUpdate::default());
        Self {
            current: ArcSwapOption::empty(),
            last_error: ArcSwapOption::empty(),
            updates,
        }
    }

    pub(crate) fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    pub(crate) fn last_error(&self) -> Option<Arc<CoreError>> {
        self.last_error.load_full()
    }

    /// Replace the current snapshot and clear the error signal.
    pub(crate) fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.current.store(Some(Arc::clone(&snapshot)));
        self.last_error.store(None);
        self.notify();
        snapshot
    }

    /// Raise the error signal; the current snapshot is left alone.
    pub(crate) fn fail(&self, error: Arc<CoreError>) {
        self.last_error.store(Some(error));
        self.notify();
    }

    pub(crate) fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.updates.subscribe())
    }

    /// Bump the version and broadcast the current pair.
    fn notify(&self) {
        let snapshot = self.current();
        let error = self.last_error();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.updates.send_modify(|update| {
            *update = SyncUpdate {
                version: update.version + 1,
                snapshot,
                error,
            };
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::parse::ParseError;
    use chrono::Utc;

    #[test]
    fn starts_empty() {
        let store = SnapshotStore::new();
        assert!(store.current().is_none());
        assert!(store.last_error().is_none());
    }

    #[test]
    fn failure_keeps_snapshot_and_publish_clears_error() {
        let store = SnapshotStore::new();
        let first = store.publish(aggregate(Vec::new(), Utc::now(), 0));

        store.fail(Arc::new(CoreError::EmptyPayload));
        assert!(Arc::ptr_eq(&store.current().unwrap(), &first));
        assert!(store.last_error().is_some());

        store.publish(aggregate(Vec::new(), Utc::now(), 0));
        assert!(store.last_error().is_none());
        assert!(!Arc::ptr_eq(&store.current().unwrap(), &first));
    }

    #[test]
    fn every_write_bumps_the_version() {
        let store = SnapshotStore::new();
        let stream = store.subscribe();
        assert_eq!(stream.latest().version, 0);

        store.publish(aggregate(Vec::new(), Utc::now(), 0));
        store.fail(Arc::new(CoreError::Parse(ParseError::Empty)));

        let latest = stream.latest();
        assert_eq!(latest.version, 2);
        assert!(latest.snapshot.is_some());
        assert!(latest.error.is_some());
    }
}
