//! Event handler trait with no-op defaults.

use super::types::*;

/// Observer of validation lifecycle events. Every method has a no-op
/// default, so handlers implement only what they care about.
pub trait ValidationEventHandler: Send + Sync {
    fn on_cycle_started(&self, _event: &CycleStartedEvent) {}
    fn on_cycle_completed(&self, _event: &CycleCompletedEvent) {}
    fn on_cycle_failed(&self, _event: &CycleFailedEvent) {}
    fn on_issue_detected(&self, _event: &IssueDetectedEvent) {}
    fn on_rule_toggled(&self, _event: &RuleToggledEvent) {}
    fn on_error(&self, _event: &ErrorEvent) {}
}
