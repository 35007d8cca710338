//! SQLite persistence for the lintel validation engine.
//!
//! Write-serialized + read-pooled connections, numbered migrations,
//! tenant-scoped query modules, skip/limit pagination, tiered retention.

pub mod connection;
pub mod migrations;
pub mod pagination;
pub mod queries;
pub mod retention;

pub use connection::DatabaseManager;
