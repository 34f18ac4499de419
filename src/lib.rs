// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod geo;
pub mod ingest;
pub mod source;
pub mod store;
