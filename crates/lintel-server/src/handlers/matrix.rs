//! GET /validation/traceability-matrix.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use lintel_core::model::Layer;
use lintel_storage::queries::matrix;

use crate::auth::AuthContext;
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatrixQuery {
    pub source_layer: Option<String>,
    pub target_layer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatrixCellResponse {
    pub source_layer: String,
    pub target_layer: String,
    pub source_entity_type: String,
    pub target_entity_type: String,
    pub relationship_type: String,
    pub connection_count: u32,
    pub missing_connections: u32,
    pub strength_score: f64,
    pub computed_at: i64,
}

#[derive(Debug, Serialize)]
pub struct MatrixResponse {
    pub cells: Vec<MatrixCellResponse>,
}

fn validate_layer(value: Option<String>, field: &str) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let layer = Layer::parse(&raw)
                .ok_or_else(|| ApiError::Unprocessable(format!("unknown {field}: {raw}")))?;
            Ok(Some(layer.as_str().to_string()))
        }
    }
}

/// The tenant's cross-layer matrix, optionally filtered by layer.
pub async fn get_matrix(
    State(state): State<AppState>,
    context: AuthContext,
    Query(query): Query<MatrixQuery>,
) -> Result<Json<MatrixResponse>> {
    let source_layer = validate_layer(query.source_layer, "source_layer")?;
    let target_layer = validate_layer(query.target_layer, "target_layer")?;

    let tenant_id = context.tenant_id;
    let rows = state.db.with_reader(|conn| {
        matrix::query_matrix(
            conn,
            &tenant_id,
            source_layer.as_deref(),
            target_layer.as_deref(),
        )
    })?;

    Ok(Json(MatrixResponse {
        cells: rows
            .into_iter()
            .map(|r| MatrixCellResponse {
                source_layer: r.source_layer,
                target_layer: r.target_layer,
                source_entity_type: r.source_entity_type,
                target_entity_type: r.target_entity_type,
                relationship_type: r.relationship_type,
                connection_count: r.connection_count,
                missing_connections: r.missing_connections,
                strength_score: r.strength_score,
                computed_at: r.computed_at,
            })
            .collect(),
    }))
}
