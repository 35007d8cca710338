//! POST/GET /validation/exceptions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use lintel_core::time::now_epoch_secs;
use lintel_storage::queries::{exceptions, rules};

use crate::auth::AuthContext;
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateExceptionRequest {
    pub entity_type: String,
    pub entity_id: String,
    pub reason: String,
    #[serde(default)]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ExceptionResponse {
    pub id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub rule_id: Option<String>,
    pub reason: String,
    pub created_by: String,
    pub expires_at: Option<i64>,
    pub is_active: bool,
    /// Whether this exception suppresses issues right now: active and
    /// not past its expiry.
    pub is_effective: bool,
    pub created_at: i64,
}

fn to_response(row: exceptions::ExceptionRow, now: i64) -> ExceptionResponse {
    let is_effective = row.is_active && row.expires_at.map_or(true, |at| at > now);
    ExceptionResponse {
        id: row.id,
        entity_type: row.entity_type,
        entity_id: row.entity_id,
        rule_id: row.rule_id,
        reason: row.reason,
        created_by: row.created_by,
        expires_at: row.expires_at,
        is_active: row.is_active,
        is_effective,
        created_at: row.created_at,
    }
}

/// Create an exception. Admin/Owner only.
pub async fn create_exception(
    State(state): State<AppState>,
    context: AuthContext,
    Json(body): Json<CreateExceptionRequest>,
) -> Result<(StatusCode, Json<ExceptionResponse>)> {
    context.require_admin()?;

    for (field, value) in [
        ("entity_type", &body.entity_type),
        ("entity_id", &body.entity_id),
        ("reason", &body.reason),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::Unprocessable(format!("{field} must not be empty")));
        }
    }

    let now = now_epoch_secs();
    if let Some(expires_at) = body.expires_at {
        if expires_at <= now {
            return Err(ApiError::Unprocessable(
                "expires_at must be in the future".into(),
            ));
        }
    }

    // A rule-scoped exception must reference a rule that exists.
    if let Some(ref rule_id) = body.rule_id {
        let known = state.db.with_reader(|conn| rules::get_rule(conn, rule_id))?;
        if known.is_none() {
            return Err(ApiError::NotFound {
                entity: "validation_rule",
            });
        }
    }

    let row = exceptions::ExceptionRow {
        id: uuid::Uuid::new_v4().to_string(),
        tenant_id: context.tenant_id.clone(),
        entity_type: body.entity_type.trim().to_string(),
        entity_id: body.entity_id.trim().to_string(),
        rule_id: body.rule_id,
        reason: body.reason.trim().to_string(),
        created_by: context.user_id,
        expires_at: body.expires_at,
        is_active: true,
        created_at: now,
    };
    state
        .db
        .with_writer(|conn| exceptions::insert_exception(conn, &row))?;

    Ok((StatusCode::CREATED, Json(to_response(row, now))))
}

#[derive(Debug, Serialize)]
pub struct ExceptionListResponse {
    pub exceptions: Vec<ExceptionResponse>,
}

/// All of the tenant's exceptions, including lapsed ones (marked
/// ineffective), newest first.
pub async fn list_exceptions(
    State(state): State<AppState>,
    context: AuthContext,
) -> Result<Json<ExceptionListResponse>> {
    let tenant_id = context.tenant_id;
    let rows = state
        .db
        .with_reader(|conn| exceptions::query_by_tenant(conn, &tenant_id))?;
    let now = now_epoch_secs();

    Ok(Json(ExceptionListResponse {
        exceptions: rows.into_iter().map(|r| to_response(r, now)).collect(),
    }))
}
