//! POST /validation/run and GET /validation/history.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use lintel_core::traits::CancellationToken;
use lintel_storage::pagination::PageParams;
use lintel_storage::queries::cycles;

use crate::auth::AuthContext;
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub rule_set_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CycleResponse {
    pub id: i64,
    pub tenant_id: String,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub triggered_by: String,
    pub rule_set_id: Option<String>,
    pub total_issues_found: Option<i64>,
    pub execution_status: String,
    pub maturity_score: Option<f64>,
    pub error: Option<String>,
}

impl From<cycles::CycleRow> for CycleResponse {
    fn from(row: cycles::CycleRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            started_at: row.started_at,
            completed_at: row.completed_at,
            triggered_by: row.triggered_by,
            rule_set_id: row.rule_set_id,
            total_issues_found: row.total_issues_found,
            execution_status: row.execution_status,
            maturity_score: row.maturity_score,
            error: row.error,
        }
    }
}

/// Start a validation cycle. Runs synchronously: the response carries
/// the terminal cycle row. Admin/Owner only. The body is optional.
pub async fn run_cycle(
    State(state): State<AppState>,
    context: AuthContext,
    body: axum::body::Bytes,
) -> Result<Json<CycleResponse>> {
    context.require_admin()?;

    let rule_set_id = if body.is_empty() {
        None
    } else {
        let parsed: RunRequest = serde_json::from_slice(&body)
            .map_err(|e| ApiError::Unprocessable(format!("invalid body: {e}")))?;
        parsed.rule_set_id
    };
    let runner = state.runner.clone();
    let tenant_id = context.tenant_id.clone();
    let triggered_by = context.user_id.clone();

    // The evaluator is synchronous; keep it off the async workers.
    let cycle = tokio::task::spawn_blocking(move || {
        let token = CancellationToken::new();
        runner.run(&tenant_id, &triggered_by, rule_set_id.as_deref(), &token)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("cycle task aborted: {e}")))??;

    state
        .metrics
        .record_cycle(cycle.total_issues_found.unwrap_or(0) as u64);

    Ok(Json(CycleResponse::from(cycle)))
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub cycles: Vec<CycleResponse>,
    pub total: u64,
    pub skip: u32,
    pub limit: u32,
    pub has_more: bool,
    pub average_maturity: Option<f64>,
}

/// Paginated cycle history plus average maturity over completed cycles.
pub async fn history(
    State(state): State<AppState>,
    context: AuthContext,
    Query(page): Query<PageParams>,
) -> Result<Json<HistoryResponse>> {
    let tenant_id = context.tenant_id;
    let (history, average_maturity) = state.db.with_reader(|conn| {
        let history = cycles::query_history(conn, &tenant_id, page)?;
        let average = cycles::average_maturity(conn, &tenant_id)?;
        Ok((history, average))
    })?;

    Ok(Json(HistoryResponse {
        cycles: history.items.into_iter().map(CycleResponse::from).collect(),
        total: history.total,
        skip: history.skip,
        limit: history.limit,
        has_more: history.has_more,
        average_maturity,
    }))
}
