//! In-process validation events.
//!
//! Synchronous dispatch; handlers are panic-isolated so one misbehaving
//! observer cannot break a cycle.

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::ValidationEventHandler;
pub use types::*;
