//! Shelfmark Book Cache
//!
//! Process-local cache of catalog book records used when assembling reading
//! lists:
//!
//! - **Store**: identifier → slot map behind one lock
//! - **Lookup**: coalesces concurrent lookups so each missing identifier is
//!   fetched from the catalog at most once per round
//! - **Sweeper**: background loop evicting entries past a maximum age
//!
//! ## Configuration
//!
//! ```toml
//! [book_cache]
//! enabled = true
//! sweep_interval_seconds = 300
//! max_age_seconds = 3600
//! ```

mod config;
mod lock;
mod lookup;
mod slot;
mod store;
mod sweeper;
mod timer;

pub use config::BookCacheConfig;
pub use lookup::{BookInfoLookup, LookupError};
pub use slot::CacheSlot;
pub use store::BookInfoStore;
pub use sweeper::{EvictionSweeper, SweepSummary, run_eviction_loop};
pub use timer::{IntervalTimer, ManualTicker, ManualTimer, PeriodicTimer, TimerStop};
