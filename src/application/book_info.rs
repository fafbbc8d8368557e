//! Book-info service used when assembling reading lists.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::catalog::BookCatalog;
use crate::application::error::AppError;
use crate::cache::{BookCacheConfig, BookInfoLookup, BookInfoStore};
use crate::domain::books::{BookRecord, validate_lookup_ids};

/// Resolves reading-list book identifiers into records, honouring the
/// configured cache switch.
pub struct BookInfoService {
    lookup: BookInfoLookup,
    cache_enabled: bool,
}

impl BookInfoService {
    pub fn new(
        config: &BookCacheConfig,
        store: Arc<BookInfoStore>,
        catalog: Arc<dyn BookCatalog>,
    ) -> Self {
        Self {
            lookup: BookInfoLookup::new(store, catalog),
            cache_enabled: config.enabled,
        }
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn store(&self) -> &Arc<BookInfoStore> {
        self.lookup.store()
    }

    /// Validate `ids`, resolve them and return the found records ordered by id.
    #[instrument(skip_all, fields(requested = ids.len()))]
    pub async fn get_books_info(&self, ids: &[String]) -> Result<Vec<BookRecord>, AppError> {
        validate_lookup_ids(ids)?;

        let mut books = self.lookup.get_books_info(ids, self.cache_enabled).await?;
        books.sort_by(|a, b| a.id.cmp(&b.id));
        books.dedup_by(|a, b| a.id == b.id);

        debug!(found = books.len(), "Book info resolved");
        Ok(books)
    }
}
