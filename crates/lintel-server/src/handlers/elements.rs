//! POST /validation/elements and POST /validation/relationships.
//!
//! Ingest endpoints for the modeled architecture the evaluator scans.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use lintel_core::model::Layer;
use lintel_core::time::now_epoch_secs;
use lintel_storage::queries::{elements, relationships};

use crate::auth::AuthContext;
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateElementRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub layer: String,
    pub entity_type: String,
    pub name: String,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct ElementResponse {
    pub id: String,
    pub layer: String,
    pub entity_type: String,
    pub name: String,
    pub attributes: serde_json::Value,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Upsert an architecture element. Admin/Owner only.
pub async fn create_element(
    State(state): State<AppState>,
    context: AuthContext,
    Json(body): Json<CreateElementRequest>,
) -> Result<(StatusCode, Json<ElementResponse>)> {
    context.require_admin()?;

    let layer = Layer::parse(&body.layer)
        .ok_or_else(|| ApiError::Unprocessable(format!("unknown layer: {}", body.layer)))?;
    if body.name.trim().is_empty() {
        return Err(ApiError::Unprocessable("name must not be empty".into()));
    }
    if body.entity_type.trim().is_empty() {
        return Err(ApiError::Unprocessable("entity_type must not be empty".into()));
    }
    let attributes = body
        .attributes
        .unwrap_or(serde_json::Value::Object(Default::default()));
    if !attributes.is_object() {
        return Err(ApiError::Unprocessable("attributes must be an object".into()));
    }

    let now = now_epoch_secs();
    let row = elements::ElementRow {
        id: body
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        tenant_id: context.tenant_id,
        layer: layer.as_str().to_string(),
        entity_type: body.entity_type.trim().to_string(),
        name: body.name.trim().to_string(),
        attributes: attributes.to_string(),
        created_at: now,
        updated_at: now,
    };
    state
        .db
        .with_writer(|conn| elements::upsert_element(conn, &row))?;

    Ok((
        StatusCode::CREATED,
        Json(ElementResponse {
            id: row.id,
            layer: row.layer,
            entity_type: row.entity_type,
            name: row.name,
            attributes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CreateRelationshipRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: String,
}

#[derive(Debug, Serialize)]
pub struct RelationshipResponse {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: String,
    pub created_at: i64,
}

/// Create a relationship between two elements of the caller's tenant.
/// 404 if either endpoint is unknown (or owned by another tenant).
pub async fn create_relationship(
    State(state): State<AppState>,
    context: AuthContext,
    Json(body): Json<CreateRelationshipRequest>,
) -> Result<(StatusCode, Json<RelationshipResponse>)> {
    context.require_admin()?;

    if body.relationship_type.trim().is_empty() {
        return Err(ApiError::Unprocessable(
            "relationship_type must not be empty".into(),
        ));
    }

    let row = relationships::RelationshipRow {
        id: body
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        tenant_id: context.tenant_id,
        source_id: body.source_id,
        target_id: body.target_id,
        relationship_type: body.relationship_type.trim().to_string(),
        created_at: now_epoch_secs(),
    };
    state
        .db
        .with_writer(|conn| relationships::insert_relationship(conn, &row))?;

    Ok((
        StatusCode::CREATED,
        Json(RelationshipResponse {
            id: row.id,
            source_id: row.source_id,
            target_id: row.target_id,
            relationship_type: row.relationship_type,
            created_at: row.created_at,
        }),
    ))
}
