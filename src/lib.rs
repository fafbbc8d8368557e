//! Shelfmark: the reading-status service's book-info layer.
//!
//! Turns lists of book ids into catalog records through a process-local,
//! request-coalescing cache with age-based eviction.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
