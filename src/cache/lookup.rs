//! Coalescing book-info lookups.
//!
//! A lookup round reserves slots for identifiers nobody is fetching yet, asks
//! the catalog for exactly those, fills every returned record, and only then
//! signals the reserved slots. Identifiers already reserved by a concurrent
//! round are simply awaited.

use std::collections::HashSet;
use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use crate::application::catalog::{BookCatalog, UpstreamError};
use crate::domain::books::BookRecord;

use super::slot::CacheSlot;
use super::store::BookInfoStore;

const METRIC_CACHE_HIT: &str = "shelfmark_book_cache_hit_total";
const METRIC_CACHE_MISS: &str = "shelfmark_book_cache_miss_total";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl LookupError {
    /// Status code to hand back to the caller, when the catalog supplied one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Upstream(err) => err.status_code(),
        }
    }
}

/// Resolves book identifiers through a shared [`BookInfoStore`], falling back
/// to the catalog for identifiers that are not resident.
#[derive(Clone)]
pub struct BookInfoLookup {
    store: Arc<BookInfoStore>,
    catalog: Arc<dyn BookCatalog>,
}

impl BookInfoLookup {
    pub fn new(store: Arc<BookInfoStore>, catalog: Arc<dyn BookCatalog>) -> Self {
        Self { store, catalog }
    }

    pub fn store(&self) -> &Arc<BookInfoStore> {
        &self.store
    }

    /// Resolve `ids` into book records.
    ///
    /// Unknown identifiers are left out of the result. The result order is
    /// unspecified. With `cache_enabled == false` the catalog is queried
    /// directly and the store is not touched.
    #[instrument(skip_all, fields(requested = ids.len(), cache_enabled = cache_enabled))]
    pub async fn get_books_info(
        &self,
        ids: &[String],
        cache_enabled: bool,
    ) -> Result<Vec<BookRecord>, LookupError> {
        if !cache_enabled {
            return Ok(self.catalog.batch_lookup(ids).await?);
        }

        let mut round = Round::new(&self.store);
        let mut waiters = JoinSet::new();

        for id in ids {
            let (slot, is_new) = self.store.probe_or_reserve(id);
            if is_new {
                counter!(METRIC_CACHE_MISS).increment(1);
                round.reserve(id.clone(), Arc::clone(&slot));
            } else {
                counter!(METRIC_CACHE_HIT).increment(1);
            }
            waiters.spawn(wait_for_slot(slot));
        }

        if !round.is_empty() {
            let to_fetch = round.ids();
            debug!(fetching = to_fetch.len(), "Fetching uncached books from catalog");
            match self.catalog.batch_lookup(&to_fetch).await {
                Ok(records) => {
                    for record in records {
                        round.fill(record);
                    }
                }
                Err(err) => {
                    round.release();
                    warn!(error = %err, fetching = to_fetch.len(), "Catalog batch lookup failed");
                    return Err(err.into());
                }
            }
        }
        round.release();

        let mut books = Vec::with_capacity(ids.len());
        while let Some(joined) = waiters.join_next().await {
            match joined {
                Ok(Some(record)) => books.push(record),
                Ok(None) => {}
                Err(err) => warn!(error = %err, "Book cache waiter did not complete"),
            }
        }
        debug!(resolved = books.len(), "Resolved books");
        Ok(books)
    }
}

async fn wait_for_slot(slot: Arc<CacheSlot>) -> Option<BookRecord> {
    slot.wait_ready().await;
    let info = slot.info();
    (!info.is_placeholder()).then_some(info)
}

/// Slots reserved by one lookup round.
///
/// Releasing signals every reserved slot and evicts the unfilled ones. A round
/// dropped before release (the lookup future was cancelled) releases itself so
/// concurrent waiters on its slots are never stranded.
struct Round<'a> {
    store: &'a BookInfoStore,
    reserved: Vec<(String, Arc<CacheSlot>)>,
    released: bool,
}

impl<'a> Round<'a> {
    fn new(store: &'a BookInfoStore) -> Self {
        Self {
            store,
            reserved: Vec::new(),
            released: false,
        }
    }

    fn reserve(&mut self, id: String, slot: Arc<CacheSlot>) {
        self.reserved.push((id, slot));
    }

    fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }

    /// Distinct reserved identifiers, in reservation order.
    ///
    /// An identifier can be reserved twice in one round when a sweep removed
    /// its first slot between two probes of a duplicated id.
    fn ids(&self) -> Vec<String> {
        let mut seen = HashSet::with_capacity(self.reserved.len());
        self.reserved
            .iter()
            .filter(|(id, _)| seen.insert(id.as_str()))
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn fill(&self, record: BookRecord) {
        if record.is_placeholder() {
            warn!("Catalog returned a record without an id; ignoring it");
            return;
        }
        let mut matched = false;
        for (_, slot) in self.reserved.iter().filter(|(id, _)| *id == record.id) {
            matched = true;
            if !self.store.fill_reserved(slot, record.clone()) {
                debug!(book_id = %record.id, "Reserved slot already resolved; keeping its record");
            }
        }
        if !matched {
            warn!(book_id = %record.id, "Catalog returned an unrequested book; ignoring it");
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.store.release_reserved(&self.reserved);
    }
}

impl Drop for Round<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
