//! HTTP surface for the lintel validation engine.
//!
//! Thin axum handlers over the engine and storage crates. Every tenant-
//! scoped route derives its tenant from verified bearer-token claims —
//! never from caller-supplied headers.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use routes::router;
pub use state::AppState;
