//! Infrastructure adapters and runtime bootstrap.

pub mod catalog_client;
pub mod error;
pub mod http;
pub mod telemetry;
