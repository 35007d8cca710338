//! Event payloads emitted across a validation cycle's lifetime.

use crate::model::{IssueType, Severity};

/// A cycle entered the `running` state.
#[derive(Debug, Clone)]
pub struct CycleStartedEvent {
    pub cycle_id: i64,
    pub tenant_id: String,
    pub triggered_by: String,
}

/// A cycle reached the `completed` terminal state.
#[derive(Debug, Clone)]
pub struct CycleCompletedEvent {
    pub cycle_id: i64,
    pub tenant_id: String,
    pub total_issues_found: u32,
    pub maturity_score: f64,
    pub duration_ms: u64,
}

/// A cycle reached the `failed` or `cancelled` terminal state.
#[derive(Debug, Clone)]
pub struct CycleFailedEvent {
    pub cycle_id: i64,
    pub tenant_id: String,
    pub error_code: String,
    pub message: String,
}

/// The evaluator produced an unsuppressed issue.
#[derive(Debug, Clone)]
pub struct IssueDetectedEvent {
    pub tenant_id: String,
    pub entity_id: String,
    pub issue_type: IssueType,
    pub severity: Severity,
}

/// A rule's activation flag was flipped.
#[derive(Debug, Clone)]
pub struct RuleToggledEvent {
    pub rule_id: String,
    pub is_active: bool,
}

/// A non-fatal error observed during evaluation.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub message: String,
    pub error_code: String,
}
