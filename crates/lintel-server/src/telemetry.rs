//! Tracing setup and the tracing-backed event handler.

use lintel_core::events::{
    CycleCompletedEvent, CycleFailedEvent, CycleStartedEvent, ErrorEvent, IssueDetectedEvent,
    RuleToggledEvent, ValidationEventHandler,
};

/// Initialize the global subscriber. `RUST_LOG` wins; default `info`.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

/// Event handler that mirrors validation lifecycle events into tracing.
pub struct TracingEventHandler;

impl ValidationEventHandler for TracingEventHandler {
    fn on_cycle_started(&self, event: &CycleStartedEvent) {
        tracing::debug!(
            cycle_id = event.cycle_id,
            tenant_id = %event.tenant_id,
            triggered_by = %event.triggered_by,
            "cycle started"
        );
    }

    fn on_cycle_completed(&self, event: &CycleCompletedEvent) {
        tracing::debug!(
            cycle_id = event.cycle_id,
            tenant_id = %event.tenant_id,
            total_issues = event.total_issues_found,
            maturity = event.maturity_score,
            duration_ms = event.duration_ms,
            "cycle completed"
        );
    }

    fn on_cycle_failed(&self, event: &CycleFailedEvent) {
        tracing::warn!(
            cycle_id = event.cycle_id,
            tenant_id = %event.tenant_id,
            code = %event.error_code,
            message = %event.message,
            "cycle did not complete"
        );
    }

    fn on_issue_detected(&self, event: &IssueDetectedEvent) {
        tracing::debug!(
            tenant_id = %event.tenant_id,
            entity_id = %event.entity_id,
            issue_type = ?event.issue_type,
            severity = %event.severity,
            "issue detected"
        );
    }

    fn on_rule_toggled(&self, event: &RuleToggledEvent) {
        tracing::info!(rule_id = %event.rule_id, is_active = event.is_active, "rule toggled");
    }

    fn on_error(&self, event: &ErrorEvent) {
        tracing::warn!(code = %event.error_code, message = %event.message, "evaluation error");
    }
}
