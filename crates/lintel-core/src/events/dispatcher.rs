//! EventDispatcher — synchronous event dispatch with zero overhead when empty.

use std::sync::Arc;

use super::handler::ValidationEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
///
/// When no handlers are registered, `emit` iterates over an empty Vec —
/// effectively zero cost.
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn ValidationEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn ValidationEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// Handlers that panic are caught and do not prevent subsequent
    /// handlers from receiving the event.
    fn emit<F: Fn(&dyn ValidationEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!("validation event handler panicked");
            }
        }
    }

    pub fn emit_cycle_started(&self, event: &CycleStartedEvent) {
        self.emit(|h| h.on_cycle_started(event));
    }

    pub fn emit_cycle_completed(&self, event: &CycleCompletedEvent) {
        self.emit(|h| h.on_cycle_completed(event));
    }

    pub fn emit_cycle_failed(&self, event: &CycleFailedEvent) {
        self.emit(|h| h.on_cycle_failed(event));
    }

    pub fn emit_issue_detected(&self, event: &IssueDetectedEvent) {
        self.emit(|h| h.on_issue_detected(event));
    }

    pub fn emit_rule_toggled(&self, event: &RuleToggledEvent) {
        self.emit(|h| h.on_rule_toggled(event));
    }

    pub fn emit_error(&self, event: &ErrorEvent) {
        self.emit(|h| h.on_error(event));
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
