//! GET /validation/issues and POST /validation/issues/{id}/resolve.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use lintel_core::time::now_epoch_secs;
use lintel_storage::pagination::PageParams;
use lintel_storage::queries::issues;

use crate::auth::AuthContext;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub id: String,
    pub cycle_id: Option<i64>,
    pub entity_type: String,
    pub entity_id: String,
    pub rule_id: Option<String>,
    pub issue_type: String,
    pub severity: String,
    pub description: String,
    pub recommended_fix: Option<String>,
    pub metadata: serde_json::Value,
    pub is_resolved: bool,
    pub resolved_at: Option<i64>,
    pub resolved_by: Option<String>,
    pub created_at: i64,
}

impl From<issues::IssueRow> for IssueResponse {
    fn from(row: issues::IssueRow) -> Self {
        Self {
            id: row.id,
            cycle_id: row.cycle_id,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            rule_id: row.rule_id,
            issue_type: row.issue_type,
            severity: row.severity,
            description: row.description,
            recommended_fix: row.recommended_fix,
            metadata: serde_json::from_str(&row.metadata)
                .unwrap_or(serde_json::Value::Object(Default::default())),
            is_resolved: row.is_resolved,
            resolved_at: row.resolved_at,
            resolved_by: row.resolved_by,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeverityCountsResponse {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
    pub total: u32,
}

#[derive(Debug, Serialize)]
pub struct IssueListResponse {
    pub issues: Vec<IssueResponse>,
    pub total: u64,
    pub skip: u32,
    pub limit: u32,
    pub has_more: bool,
    pub severity_counts: SeverityCountsResponse,
}

/// Newest-first issue page plus tenant-wide unresolved severity counts.
pub async fn list_issues(
    State(state): State<AppState>,
    context: AuthContext,
    Query(page): Query<PageParams>,
) -> Result<Json<IssueListResponse>> {
    let tenant_id = context.tenant_id;
    let (page_result, counts) = state.db.with_reader(|conn| {
        let page_result = issues::query_page(conn, &tenant_id, page)?;
        let counts = issues::severity_counts(conn, &tenant_id)?;
        Ok((page_result, counts))
    })?;

    Ok(Json(IssueListResponse {
        issues: page_result
            .items
            .into_iter()
            .map(IssueResponse::from)
            .collect(),
        total: page_result.total,
        skip: page_result.skip,
        limit: page_result.limit,
        has_more: page_result.has_more,
        severity_counts: SeverityCountsResponse {
            low: counts.low,
            medium: counts.medium,
            high: counts.high,
            critical: counts.critical,
            total: counts.total(),
        },
    }))
}

/// Mark an issue resolved. Idempotent: resolving an already-resolved
/// issue returns the stored state untouched.
pub async fn resolve_issue(
    State(state): State<AppState>,
    context: AuthContext,
    Path(issue_id): Path<String>,
) -> Result<Json<IssueResponse>> {
    let row = state.db.with_writer(|conn| {
        issues::resolve_issue(
            conn,
            &context.tenant_id,
            &issue_id,
            &context.user_id,
            now_epoch_secs(),
        )
    })?;
    Ok(Json(IssueResponse::from(row)))
}
