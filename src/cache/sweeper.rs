//! Background eviction of aged book cache entries.

use std::sync::Arc;
use std::time::Duration;

use metrics::histogram;
use tracing::{info, instrument};

use super::store::BookInfoStore;
use super::timer::PeriodicTimer;

const METRIC_CACHE_EVICTED: &str = "shelfmark_book_cache_evicted";

/// Totals reported when an eviction loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub sweeps: u64,
    pub evicted: u64,
}

/// Removes entries older than `max_age` from a [`BookInfoStore`] on every
/// tick of its timer.
pub struct EvictionSweeper {
    store: Arc<BookInfoStore>,
    max_age: Duration,
}

impl EvictionSweeper {
    pub fn new(store: Arc<BookInfoStore>, max_age: Duration) -> Self {
        Self { store, max_age }
    }

    /// Run a single sweep and report the evicted count.
    pub fn sweep_once(&self) -> usize {
        let evicted = self.store.sweep(self.max_age);
        histogram!(METRIC_CACHE_EVICTED).record(evicted as f64);
        info!(
            evicted,
            remaining = self.store.len(),
            max_age_secs = self.max_age.as_secs(),
            "Book cache sweep finished"
        );
        evicted
    }

    /// Sweep on every tick until the timer's source closes, then stop it.
    #[instrument(skip_all, fields(max_age_secs = self.max_age.as_secs()))]
    pub async fn run<T: PeriodicTimer>(self, mut timer: T) -> SweepSummary {
        let mut summary = SweepSummary::default();
        while timer.tick().await.is_some() {
            summary.sweeps += 1;
            summary.evicted += self.sweep_once() as u64;
        }
        timer.stop();

        info!(
            sweeps = summary.sweeps,
            evicted = summary.evicted,
            "Book cache sweeper stopped"
        );
        summary
    }
}

/// Drive an [`EvictionSweeper`] over `store` with the given timer.
pub async fn run_eviction_loop<T: PeriodicTimer>(
    store: Arc<BookInfoStore>,
    max_age: Duration,
    timer: T,
) -> SweepSummary {
    EvictionSweeper::new(store, max_age).run(timer).await
}

#[cfg(test)]
mod tests {
    use time::{Duration as TimeDuration, OffsetDateTime};

    use super::*;
    use crate::cache::timer::ManualTimer;
    use crate::domain::books::BookRecord;

    #[tokio::test]
    async fn single_tick_sweeps_then_stops() {
        let store = Arc::new(BookInfoStore::new());
        let now = OffsetDateTime::now_utc();
        store.insert_at(BookRecord::new("old", "Old", vec![]), now - TimeDuration::hours(2));
        store.insert_at(BookRecord::new("new", "New", vec![]), now);

        let (timer, ticker) = ManualTimer::new();
        assert!(ticker.fire());
        drop(ticker);

        let summary = run_eviction_loop(Arc::clone(&store), Duration::from_secs(3600), timer).await;

        assert_eq!(
            summary,
            SweepSummary {
                sweeps: 1,
                evicted: 1
            }
        );
        assert!(store.contains("new"));
        assert!(!store.contains("old"));
    }

    #[tokio::test]
    async fn closed_source_exits_without_sweeping() {
        let store = Arc::new(BookInfoStore::new());
        let _ = store.probe_or_reserve("pending");

        let (timer, ticker) = ManualTimer::new();
        drop(ticker);

        let summary = EvictionSweeper::new(Arc::clone(&store), Duration::from_secs(60))
            .run(timer)
            .await;

        assert_eq!(summary, SweepSummary::default());
        assert!(store.contains("pending"));
    }

    #[test]
    fn sweep_once_reports_count() {
        let store = Arc::new(BookInfoStore::new());
        let _ = store.probe_or_reserve("a");
        let _ = store.probe_or_reserve("b");

        let sweeper = EvictionSweeper::new(Arc::clone(&store), Duration::from_secs(60));
        assert_eq!(sweeper.sweep_once(), 2);
        assert_eq!(sweeper.sweep_once(), 0);
    }
}
