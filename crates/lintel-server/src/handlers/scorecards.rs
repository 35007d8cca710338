//! GET /validation/scorecard.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use lintel_storage::queries::{cycles, scorecards};

use crate::auth::AuthContext;
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScorecardQuery {
    pub cycle_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LayerScoresResponse {
    pub layer: String,
    pub completeness_score: f64,
    pub traceability_score: f64,
    pub alignment_score: f64,
    pub overall_score: f64,
    pub low_issues: u32,
    pub medium_issues: u32,
    pub high_issues: u32,
    pub critical_issues: u32,
}

#[derive(Debug, Serialize)]
pub struct ScorecardResponse {
    pub cycle_id: i64,
    pub execution_status: String,
    pub maturity_score: Option<f64>,
    pub layers: Vec<LayerScoresResponse>,
}

/// Scorecard for a specific cycle, or the most recent completed cycle
/// when `cycle_id` is omitted. 404 when neither exists.
pub async fn get_scorecard(
    State(state): State<AppState>,
    context: AuthContext,
    Query(query): Query<ScorecardQuery>,
) -> Result<Json<ScorecardResponse>> {
    let tenant_id = context.tenant_id;
    let (cycle, cards) = state.db.with_reader(|conn| {
        let cycle = match query.cycle_id {
            Some(id) => cycles::get_cycle(conn, &tenant_id, id)?,
            None => cycles::latest_completed_cycle(conn, &tenant_id)?,
        };
        let Some(cycle) = cycle else {
            return Ok((None, Vec::new()));
        };
        let cards = scorecards::query_by_cycle(conn, &tenant_id, cycle.id)?;
        Ok((Some(cycle), cards))
    })?;

    let cycle = cycle.ok_or(ApiError::NotFound {
        entity: "validation_cycle",
    })?;
    if cards.is_empty() {
        // The cycle exists but never emitted scorecards (failed/cancelled).
        return Err(ApiError::NotFound {
            entity: "validation_scorecard",
        });
    }

    Ok(Json(ScorecardResponse {
        cycle_id: cycle.id,
        execution_status: cycle.execution_status,
        maturity_score: cycle.maturity_score,
        layers: cards
            .into_iter()
            .map(|c| LayerScoresResponse {
                layer: c.layer,
                completeness_score: c.completeness_score,
                traceability_score: c.traceability_score,
                alignment_score: c.alignment_score,
                overall_score: c.overall_score,
                low_issues: c.low_issues,
                medium_issues: c.medium_issues,
                high_issues: c.high_issues,
                critical_issues: c.critical_issues,
            })
            .collect(),
    }))
}
