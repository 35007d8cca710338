//! Validation cycle orchestration.
//!
//! A cycle runs synchronously: the caller gets back a terminal row.
//! `running → {completed, failed, cancelled}`; timeout surfaces as
//! `failed`, a tripped cancellation token as `cancelled`. Failed cycles
//! are never retried here — the caller triggers a new run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use lintel_core::errors::{EvaluationError, LintelErrorCode, StorageError};
use lintel_core::events::{
    CycleCompletedEvent, CycleFailedEvent, CycleStartedEvent, ErrorEvent, EventDispatcher,
    IssueDetectedEvent,
};
use lintel_core::model::{Layer, RuleType};
use lintel_core::time::now_epoch_secs;
use lintel_core::traits::CancellationToken;
use lintel_storage::connection::writer::with_immediate_transaction;
use lintel_storage::queries::{cycles, elements, exceptions, issues, matrix, rules, scorecards};
use lintel_storage::DatabaseManager;

use crate::evaluator::{evaluate_rules, IssueCandidate};
use crate::exceptions::ExceptionOverlay;
use crate::matrix::build_matrix;
use crate::scorecard::{compute_scorecards, maturity_score, ScoredFinding};

/// Runs validation cycles against the shared database.
pub struct CycleRunner {
    db: Arc<DatabaseManager>,
    dispatcher: Arc<EventDispatcher>,
    timeout: Duration,
}

impl CycleRunner {
    pub fn new(db: Arc<DatabaseManager>, dispatcher: Arc<EventDispatcher>, timeout: Duration) -> Self {
        Self {
            db,
            dispatcher,
            timeout,
        }
    }

    /// Execute one validation cycle for a tenant and return the terminal
    /// cycle row. `Err` means even recording the outcome failed.
    pub fn run(
        &self,
        tenant_id: &str,
        triggered_by: &str,
        rule_set_id: Option<&str>,
        token: &CancellationToken,
    ) -> Result<cycles::CycleRow, EvaluationError> {
        let started_at = now_epoch_secs();
        let started_clock = Instant::now();

        let cycle_id = self.db.with_writer(|conn| {
            cycles::insert_cycle_start(conn, tenant_id, started_at, triggered_by, rule_set_id)
        })?;

        self.dispatcher.emit_cycle_started(&CycleStartedEvent {
            cycle_id,
            tenant_id: tenant_id.to_string(),
            triggered_by: triggered_by.to_string(),
        });
        tracing::info!(cycle_id, tenant_id, triggered_by, "validation cycle started");

        match self.execute(tenant_id, cycle_id, started_clock, token) {
            Ok(outcome) => {
                self.dispatcher.emit_cycle_completed(&CycleCompletedEvent {
                    cycle_id,
                    tenant_id: tenant_id.to_string(),
                    total_issues_found: outcome.total_issues,
                    maturity_score: outcome.maturity,
                    duration_ms: started_clock.elapsed().as_millis() as u64,
                });
                tracing::info!(
                    cycle_id,
                    tenant_id,
                    total_issues = outcome.total_issues,
                    suppressed = outcome.suppressed,
                    maturity = outcome.maturity,
                    "validation cycle completed"
                );
                self.fetch_cycle(tenant_id, cycle_id)
            }
            Err(EvaluationError::Cancelled) => {
                self.finish_aborted(tenant_id, cycle_id, "cancelled", "cycle cancelled")?;
                self.fetch_cycle(tenant_id, cycle_id)
            }
            Err(EvaluationError::Timeout { .. }) => {
                let message = format!("cycle timed out after {}s", self.timeout.as_secs());
                self.finish_aborted(tenant_id, cycle_id, "failed", &message)?;
                self.fetch_cycle(tenant_id, cycle_id)
            }
            Err(error) => {
                // Storage or other hard failure: record it, sanitized.
                tracing::error!(cycle_id, tenant_id, %error, "validation cycle failed");
                self.finish_aborted(tenant_id, cycle_id, "failed", "internal evaluation error")?;
                self.fetch_cycle(tenant_id, cycle_id)
            }
        }
    }

    fn execute(
        &self,
        tenant_id: &str,
        cycle_id: i64,
        started_clock: Instant,
        token: &CancellationToken,
    ) -> Result<CycleOutcome, EvaluationError> {
        let now = now_epoch_secs();

        let active_rules = self.db.with_reader(rules::query_active)?;
        let tenant_elements = self
            .db
            .with_reader(|conn| elements::query_by_tenant(conn, tenant_id))?;
        let tenant_relationships = self
            .db
            .with_reader(|conn| {
                lintel_storage::queries::relationships::query_by_tenant(conn, tenant_id)
            })?;
        let exception_rows = self
            .db
            .with_reader(|conn| exceptions::query_effective(conn, tenant_id, now))?;

        let deadline = started_clock + self.timeout;
        let report = evaluate_rules(
            &active_rules,
            &tenant_elements,
            &tenant_relationships,
            now,
            token,
            deadline,
        )?;

        for error in &report.errors {
            tracing::warn!(cycle_id, tenant_id, %error, "rule skipped");
            self.dispatcher.emit_error(&ErrorEvent {
                message: error.to_string(),
                error_code: error.error_code().to_string(),
            });
        }

        let overlay = ExceptionOverlay::from_rows(&exception_rows, now);
        let (survivors, suppressed) = overlay.apply(report.data);

        let findings = scored_findings(&active_rules, &tenant_elements, &survivors);
        let cards = compute_scorecards(&tenant_elements, &findings);
        let maturity = maturity_score(&cards);
        let matrix_rows = build_matrix(tenant_id, &tenant_elements, &tenant_relationships, now);

        let total_issues = survivors.len() as u32;
        let completed_at = now_epoch_secs();

        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                for candidate in &survivors {
                    issues::insert_issue(tx, &issue_row(tenant_id, cycle_id, now, candidate))?;
                }
                for card in &cards {
                    scorecards::insert_scorecard(
                        tx,
                        &scorecards::ScorecardRow {
                            id: 0,
                            tenant_id: tenant_id.to_string(),
                            cycle_id,
                            layer: card.layer.as_str().to_string(),
                            completeness_score: card.completeness_score,
                            traceability_score: card.traceability_score,
                            alignment_score: card.alignment_score,
                            overall_score: card.overall_score,
                            low_issues: card.low_issues,
                            medium_issues: card.medium_issues,
                            high_issues: card.high_issues,
                            critical_issues: card.critical_issues,
                            created_at: completed_at,
                        },
                    )?;
                }
                matrix::replace_matrix(tx, tenant_id, &matrix_rows)?;
                cycles::update_cycle_terminal(
                    tx,
                    cycle_id,
                    completed_at,
                    total_issues as i64,
                    "completed",
                    Some(maturity),
                    None,
                )
            })
        })?;

        for candidate in &survivors {
            self.dispatcher.emit_issue_detected(&IssueDetectedEvent {
                tenant_id: tenant_id.to_string(),
                entity_id: candidate.entity_id.clone(),
                issue_type: candidate.issue_type,
                severity: candidate.severity,
            });
        }

        self.db.checkpoint()?;

        Ok(CycleOutcome {
            total_issues,
            suppressed,
            maturity,
        })
    }

    fn finish_aborted(
        &self,
        tenant_id: &str,
        cycle_id: i64,
        status: &str,
        message: &str,
    ) -> Result<(), StorageError> {
        tracing::warn!(cycle_id, tenant_id, status, message, "validation cycle aborted");
        self.dispatcher.emit_cycle_failed(&CycleFailedEvent {
            cycle_id,
            tenant_id: tenant_id.to_string(),
            error_code: status.to_string(),
            message: message.to_string(),
        });
        self.db.with_writer(|conn| {
            cycles::update_cycle_terminal(
                conn,
                cycle_id,
                now_epoch_secs(),
                0,
                status,
                None,
                Some(message),
            )
        })
    }

    fn fetch_cycle(
        &self,
        tenant_id: &str,
        cycle_id: i64,
    ) -> Result<cycles::CycleRow, EvaluationError> {
        let row = self
            .db
            .with_reader(|conn| cycles::get_cycle(conn, tenant_id, cycle_id))?;
        row.ok_or_else(|| {
            EvaluationError::Storage(StorageError::NotFound {
                entity: "validation_cycle",
                id: cycle_id.to_string(),
            })
        })
    }
}

struct CycleOutcome {
    total_issues: u32,
    suppressed: usize,
    maturity: f64,
}

/// Project surviving candidates into the aggregator's view: the layer
/// they degrade and the dimension of the rule that raised them.
fn scored_findings(
    active_rules: &[rules::RuleRow],
    tenant_elements: &[elements::ElementRow],
    survivors: &[IssueCandidate],
) -> Vec<ScoredFinding> {
    let rule_types: FxHashMap<&str, RuleType> = active_rules
        .iter()
        .filter_map(|r| RuleType::parse(&r.rule_type).map(|t| (r.id.as_str(), t)))
        .collect();
    let element_layers: FxHashMap<&str, Layer> = tenant_elements
        .iter()
        .filter_map(|e| Layer::parse(&e.layer).map(|l| (e.id.as_str(), l)))
        .collect();

    survivors
        .iter()
        .filter_map(|c| {
            Some(ScoredFinding {
                layer: *element_layers.get(c.entity_id.as_str())?,
                rule_type: *rule_types.get(c.rule_id.as_str())?,
                severity: c.severity,
            })
        })
        .collect()
}

fn issue_row(
    tenant_id: &str,
    cycle_id: i64,
    created_at: i64,
    candidate: &IssueCandidate,
) -> issues::IssueRow {
    issues::IssueRow {
        // Deterministic composite id: re-running the same cycle row is an
        // upsert, not a duplicate.
        id: format!("{cycle_id}:{}:{}", candidate.rule_id, candidate.entity_id),
        tenant_id: tenant_id.to_string(),
        cycle_id: Some(cycle_id),
        entity_type: candidate.entity_type.clone(),
        entity_id: candidate.entity_id.clone(),
        rule_id: Some(candidate.rule_id.clone()),
        issue_type: candidate.issue_type.as_str().to_string(),
        severity: candidate.severity.as_str().to_string(),
        description: candidate.description.clone(),
        recommended_fix: candidate.recommended_fix.clone(),
        metadata: candidate.metadata.to_string(),
        is_resolved: false,
        resolved_at: None,
        resolved_by: None,
        created_at,
    }
}
