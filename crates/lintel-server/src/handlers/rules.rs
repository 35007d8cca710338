//! GET/POST /validation/rules and PATCH /validation/rules/{id}.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use lintel_core::events::RuleToggledEvent;
use lintel_core::model::{Layer, RuleType, Severity};
use lintel_core::time::now_epoch_secs;
use lintel_engine::RuleLogic;
use lintel_storage::queries::rules;

use crate::auth::AuthContext;
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RuleResponse {
    pub id: String,
    pub name: String,
    pub rule_type: String,
    pub scope: String,
    pub rule_logic: serde_json::Value,
    pub severity: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<rules::RuleRow> for RuleResponse {
    fn from(row: rules::RuleRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            rule_type: row.rule_type,
            scope: row.scope,
            rule_logic: serde_json::from_str(&row.rule_logic)
                .unwrap_or(serde_json::Value::Null),
            severity: row.severity,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RuleListResponse {
    pub rules: Vec<RuleResponse>,
}

/// List all rules, global across tenants.
pub async fn list_rules(
    State(state): State<AppState>,
    _context: AuthContext,
) -> Result<Json<RuleListResponse>> {
    let rows = state.db.with_reader(rules::query_all)?;
    Ok(Json(RuleListResponse {
        rules: rows.into_iter().map(RuleResponse::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    pub name: String,
    pub rule_type: String,
    pub scope: String,
    pub severity: String,
    pub rule_logic: serde_json::Value,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Create a rule. Admin/Owner only; every enum field and the logic
/// predicate are validated before anything touches the database.
pub async fn create_rule(
    State(state): State<AppState>,
    context: AuthContext,
    Json(body): Json<CreateRuleRequest>,
) -> Result<(StatusCode, Json<RuleResponse>)> {
    context.require_admin()?;

    if body.name.trim().is_empty() {
        return Err(ApiError::Unprocessable("name must not be empty".into()));
    }
    let rule_type = RuleType::parse(&body.rule_type)
        .ok_or_else(|| ApiError::Unprocessable(format!("unknown rule_type: {}", body.rule_type)))?;
    let scope = Layer::parse(&body.scope)
        .ok_or_else(|| ApiError::Unprocessable(format!("unknown scope: {}", body.scope)))?;
    let severity = Severity::parse(&body.severity)
        .ok_or_else(|| ApiError::Unprocessable(format!("unknown severity: {}", body.severity)))?;
    let logic: RuleLogic = serde_json::from_value(body.rule_logic.clone())
        .map_err(|e| ApiError::Unprocessable(format!("invalid rule_logic: {e}")))?;

    let name = body.name.trim().to_string();
    let now = now_epoch_secs();
    let row = rules::RuleRow {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.clone(),
        rule_type: rule_type.as_str().to_string(),
        scope: scope.as_str().to_string(),
        rule_logic: serde_json::to_string(&logic)
            .map_err(|e| ApiError::Internal(e.to_string()))?,
        severity: severity.as_str().to_string(),
        is_active: body.is_active.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };

    let taken = state
        .db
        .with_reader(rules::query_all)?
        .iter()
        .any(|r| r.name == name);
    if taken {
        return Err(ApiError::Unprocessable(format!(
            "rule name already exists: {name}"
        )));
    }
    state.db.with_writer(|conn| rules::insert_rule(conn, &row))?;

    Ok((StatusCode::CREATED, Json(RuleResponse::from(row))))
}

#[derive(Debug, Deserialize)]
pub struct ToggleRuleRequest {
    pub is_active: bool,
}

/// Toggle a rule's activation. 404 for unknown ids; existing issues are
/// never touched.
pub async fn toggle_rule(
    State(state): State<AppState>,
    context: AuthContext,
    Path(rule_id): Path<String>,
    Json(body): Json<ToggleRuleRequest>,
) -> Result<Json<RuleResponse>> {
    context.require_admin()?;

    let row = state
        .db
        .with_writer(|conn| rules::set_active(conn, &rule_id, body.is_active, now_epoch_secs()))?;

    state.dispatcher.emit_rule_toggled(&RuleToggledEvent {
        rule_id: row.id.clone(),
        is_active: row.is_active,
    });

    Ok(Json(RuleResponse::from(row)))
}
