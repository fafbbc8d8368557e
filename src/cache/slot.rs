//! Per-identifier cache slot.

use std::sync::Mutex;

use time::OffsetDateTime;
use tokio::sync::watch;

use crate::domain::books::BookRecord;

use super::lock::mutex_lock;

const SOURCE: &str = "cache::slot";

/// Lookup state and result for one book identifier.
///
/// A slot starts pending with a placeholder record. Its fields are written by
/// [`BookInfoStore`](super::BookInfoStore) while the store lock is held; the
/// ready signal is raised at most once and can be awaited by any number of
/// tasks without touching the store lock.
pub struct CacheSlot {
    state: Mutex<SlotState>,
    ready: watch::Sender<bool>,
}

#[derive(Default)]
struct SlotState {
    info: BookRecord,
    updated_at: Option<OffsetDateTime>,
}

impl CacheSlot {
    pub(super) fn pending() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            state: Mutex::new(SlotState::default()),
            ready,
        }
    }

    /// Resolved record; the placeholder while pending or when absent upstream.
    pub fn info(&self) -> BookRecord {
        mutex_lock(&self.state, SOURCE, "info").info.clone()
    }

    /// Time of the last fill, `None` if never filled.
    pub fn updated_at(&self) -> Option<OffsetDateTime> {
        mutex_lock(&self.state, SOURCE, "updated_at").updated_at
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Wait until the slot's outcome is known.
    pub async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    pub(super) fn fill(&self, record: BookRecord, at: OffsetDateTime) {
        let mut state = mutex_lock(&self.state, SOURCE, "fill");
        state.info = record;
        state.updated_at = Some(at);
    }

    /// Raise the ready signal. Raising it again is a no-op.
    pub(super) fn signal(&self) {
        self.ready.send_if_modified(|ready| !std::mem::replace(ready, true));
    }

    pub(super) fn is_filled(&self) -> bool {
        !mutex_lock(&self.state, SOURCE, "is_filled")
            .info
            .is_placeholder()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn waiters_release_once_signaled() {
        let slot = Arc::new(CacheSlot::pending());
        assert!(!slot.is_ready());

        let waiter = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move {
                slot.wait_ready().await;
                slot.info()
            })
        };

        slot.fill(
            BookRecord::new("a", "Title 1", vec!["Author".into()]),
            OffsetDateTime::now_utc(),
        );
        slot.signal();

        let info = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter released")
            .expect("waiter joined");
        assert_eq!(info.id, "a");
    }

    #[tokio::test]
    async fn double_signal_keeps_slot_ready() {
        let slot = CacheSlot::pending();
        slot.signal();
        slot.signal();
        assert!(slot.is_ready());

        tokio::time::timeout(Duration::from_secs(1), slot.wait_ready())
            .await
            .expect("already-ready slot returns immediately");
    }

    #[test]
    fn pending_slot_is_unfilled() {
        let slot = CacheSlot::pending();
        assert!(!slot.is_filled());
        assert!(slot.updated_at().is_none());
        assert!(slot.info().is_placeholder());
    }
}
