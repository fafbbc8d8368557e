//! Shared book-info cache storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use time::OffsetDateTime;
use tracing::debug;

use crate::domain::books::BookRecord;

use super::lock::mutex_lock;
use super::slot::CacheSlot;

const SOURCE: &str = "cache::store";

/// Process-local map from book identifier to its cache slot.
///
/// One mutex guards the map and every slot field write. It is held only for
/// per-identifier map operations, never across the catalog call or while
/// waiting on a slot.
///
/// A slot is reachable while it is pending or after it was filled with a real
/// record. Slots that resolve to "not found" are dropped from the map as soon
/// as they are signaled.
#[derive(Default)]
pub struct BookInfoStore {
    slots: Mutex<HashMap<String, Arc<CacheSlot>>>,
}

impl BookInfoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the slot for `id`, reserving a pending one if none exists.
    ///
    /// The boolean is true when this call created the slot; the caller then
    /// owns fetching it. Everyone else only waits on the returned slot.
    pub fn probe_or_reserve(&self, id: &str) -> (Arc<CacheSlot>, bool) {
        let mut slots = mutex_lock(&self.slots, SOURCE, "probe_or_reserve");
        if let Some(slot) = slots.get(id) {
            return (Arc::clone(slot), false);
        }

        let slot = Arc::new(CacheSlot::pending());
        slots.insert(id.to_string(), Arc::clone(&slot));
        (slot, true)
    }

    /// Overwrite the record of `id` if it still has a slot. Does not signal.
    pub fn fill(&self, id: &str, record: BookRecord) {
        self.fill_at(id, record, OffsetDateTime::now_utc());
    }

    pub fn fill_at(&self, id: &str, record: BookRecord, at: OffsetDateTime) {
        let slots = mutex_lock(&self.slots, SOURCE, "fill");
        if let Some(slot) = slots.get(id) {
            slot.fill(record, at);
        }
    }

    /// Signal every listed identifier and drop the ones still unfilled.
    pub fn signal_and_maybe_evict<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut slots = mutex_lock(&self.slots, SOURCE, "signal_and_maybe_evict");
        for id in ids {
            let id = id.as_ref();
            let Some(slot) = slots.get(id).cloned() else {
                continue;
            };
            release_locked(&mut slots, id, &slot);
        }
    }

    /// Fill a slot reserved by the caller, even if it has since been swept
    /// out of the map, so that its waiters still see the record.
    ///
    /// A slot that is already signaled keeps its outcome; returns false then.
    pub(super) fn fill_reserved(&self, slot: &CacheSlot, record: BookRecord) -> bool {
        let _slots = mutex_lock(&self.slots, SOURCE, "fill_reserved");
        if slot.is_ready() {
            return false;
        }
        slot.fill(record, OffsetDateTime::now_utc());
        true
    }

    /// Signal slots reserved by the caller and drop the unfilled ones.
    ///
    /// Works on the reserved handles rather than on the map so that a slot
    /// swept while pending is still released, and a newer slot for the same
    /// identifier is left alone.
    pub(super) fn release_reserved(&self, reserved: &[(String, Arc<CacheSlot>)]) {
        let mut slots = mutex_lock(&self.slots, SOURCE, "release_reserved");
        for (id, slot) in reserved {
            release_locked(&mut slots, id, slot);
        }
    }

    /// Store a resolved record directly, replacing any existing slot.
    pub fn insert(&self, record: BookRecord) {
        self.insert_at(record, OffsetDateTime::now_utc());
    }

    pub fn insert_at(&self, record: BookRecord, at: OffsetDateTime) {
        if record.is_placeholder() {
            return;
        }
        let slot = Arc::new(CacheSlot::pending());
        slot.fill(record.clone(), at);
        slot.signal();

        let mut slots = mutex_lock(&self.slots, SOURCE, "insert");
        let previous = slots.insert(record.id.clone(), slot);
        // Anyone still waiting on a replaced pending slot reads the new record.
        if let Some(previous) = previous.filter(|previous| !previous.is_ready()) {
            previous.fill(record, at);
            previous.signal();
        }
    }

    /// Remove every slot filled longer than `max_age` ago, and every slot that
    /// was never filled. Returns the number removed.
    pub fn sweep(&self, max_age: Duration) -> usize {
        self.sweep_at(max_age, OffsetDateTime::now_utc())
    }

    pub fn sweep_at(&self, max_age: Duration, now: OffsetDateTime) -> usize {
        let mut slots = mutex_lock(&self.slots, SOURCE, "sweep");
        let before = slots.len();
        slots.retain(|_, slot| match slot.updated_at() {
            Some(updated_at) => now - updated_at <= max_age,
            None => false,
        });
        let evicted = before - slots.len();
        debug!(evicted, remaining = slots.len(), "Swept book cache");
        evicted
    }

    pub fn get(&self, id: &str) -> Option<Arc<CacheSlot>> {
        mutex_lock(&self.slots, SOURCE, "get").get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        mutex_lock(&self.slots, SOURCE, "contains").contains_key(id)
    }

    /// Number of resident slots, pending ones included.
    pub fn len(&self) -> usize {
        mutex_lock(&self.slots, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn release_locked(slots: &mut HashMap<String, Arc<CacheSlot>>, id: &str, slot: &Arc<CacheSlot>) {
    slot.signal();
    if slot.is_filled() {
        return;
    }
    if slots
        .get(id)
        .is_some_and(|current| Arc::ptr_eq(current, slot))
    {
        slots.remove(id);
    }
}
