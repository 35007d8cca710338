//! HTTP API tests: auth fail-closed paths, role gates, tenant isolation,
//! and the end-to-end run → issues → scorecard flow.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use tower::util::ServiceExt;

use lintel_core::config::LintelConfig;
use lintel_core::model::Role;
use lintel_core::time::now_epoch_secs;
use lintel_server::auth::Claims;
use lintel_server::{router, AppState};

const SECRET: &str = "test-secret";

fn app() -> Router {
    let config = LintelConfig::from_toml(&format!("[auth]\njwt_secret = \"{SECRET}\"")).unwrap();
    let state = AppState::in_memory(config).unwrap();
    router(state)
}

fn token_for(tenant_id: &str, user_id: &str, role: Option<Role>) -> String {
    let claims = Claims {
        user_id: user_id.to_string(),
        tenant_id: tenant_id.to_string(),
        role,
        exp: now_epoch_secs() + 600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

// ─── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_token_is_401() {
    let app = app();
    let response = send(&app, request("GET", "/validation/issues", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_401() {
    let app = app();
    let response = send(
        &app,
        request("GET", "/validation/issues", Some("not.a.jwt"), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_401() {
    let app = app();
    let claims = Claims {
        user_id: "u1".to_string(),
        tenant_id: "t1".to_string(),
        role: Some(Role::Owner),
        exp: now_epoch_secs() - 600,
    };
    let stale = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let response = send(&app, request("GET", "/validation/issues", Some(&stale), None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn viewer_cannot_start_a_cycle() {
    let app = app();
    let viewer = token_for("t1", "u1", None); // absent role defaults to Viewer
    let response = send(&app, request("POST", "/validation/run", Some(&viewer), None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ─── Cycles ──────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_tenant_cycle_completes_clean() {
    let app = app();
    let admin = token_for("t1", "alice", Some(Role::Admin));

    let response = send(&app, request("POST", "/validation/run", Some(&admin), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cycle = body_json(response).await;
    assert_eq!(cycle["execution_status"], "completed");
    assert_eq!(cycle["total_issues_found"], 0);
    assert_eq!(cycle["maturity_score"], 1.0);
    assert_eq!(cycle["triggered_by"], "alice");
}

#[tokio::test]
async fn history_reports_average_maturity() {
    let app = app();
    let admin = token_for("t1", "alice", Some(Role::Admin));

    send(&app, request("POST", "/validation/run", Some(&admin), None)).await;
    send(&app, request("POST", "/validation/run", Some(&admin), None)).await;

    let response = send(&app, request("GET", "/validation/history", Some(&admin), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    assert_eq!(history["total"], 2);
    assert_eq!(history["average_maturity"], 1.0);
    assert_eq!(history["cycles"].as_array().unwrap().len(), 2);
}

// ─── End-to-end: elements → run → issues ─────────────────────────────

async fn seed_business_process(app: &Router, admin: &str, id: &str) {
    let body = format!(
        r#"{{"id":"{id}","layer":"Business","entity_type":"process","name":"{id}"}}"#
    );
    let response = send(
        app,
        request("POST", "/validation/elements", Some(admin), Some(&body)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn flagged_issues_are_visible_to_viewers_of_the_same_tenant_only() {
    let app = app();
    let admin = token_for("t1", "alice", Some(Role::Admin));
    seed_business_process(&app, &admin, "proc-1").await;

    let run = send(&app, request("POST", "/validation/run", Some(&admin), None)).await;
    let cycle = body_json(run).await;
    let found = cycle["total_issues_found"].as_u64().unwrap();
    assert!(found >= 2, "expected builtin rules to flag proc-1");

    // Same-tenant viewer sees the issues and the severity counts.
    let viewer = token_for("t1", "bob", None);
    let response = send(&app, request("GET", "/validation/issues", Some(&viewer), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list["total"].as_u64().unwrap(), found);
    assert_eq!(list["severity_counts"]["total"].as_u64().unwrap(), found);

    // A viewer from another tenant sees nothing.
    let outsider = token_for("t2", "eve", None);
    let response = send(&app, request("GET", "/validation/issues", Some(&outsider), None)).await;
    let list = body_json(response).await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn resolve_is_idempotent_over_http() {
    let app = app();
    let admin = token_for("t1", "alice", Some(Role::Admin));
    seed_business_process(&app, &admin, "proc-1").await;
    send(&app, request("POST", "/validation/run", Some(&admin), None)).await;

    let list = body_json(
        send(&app, request("GET", "/validation/issues", Some(&admin), None)).await,
    )
    .await;
    let issue_id = list["issues"][0]["id"].as_str().unwrap().to_string();
    let uri = format!("/validation/issues/{issue_id}/resolve");

    let first = body_json(send(&app, request("POST", &uri, Some(&admin), None)).await).await;
    assert_eq!(first["is_resolved"], true);
    let resolved_at = first["resolved_at"].as_i64().unwrap();
    assert_eq!(first["resolved_by"], "alice");

    let second = body_json(send(&app, request("POST", &uri, Some(&admin), None)).await).await;
    assert_eq!(second["resolved_at"].as_i64().unwrap(), resolved_at);
    assert_eq!(second["resolved_by"], "alice");
}

#[tokio::test]
async fn entity_wide_exception_suppresses_issues_end_to_end() {
    let app = app();
    let admin = token_for("t1", "alice", Some(Role::Admin));
    seed_business_process(&app, &admin, "g1").await;
    seed_business_process(&app, &admin, "g2").await;

    let body = r#"{"entity_type":"process","entity_id":"g1","reason":"accepted gap"}"#;
    let response = send(
        &app,
        request("POST", "/validation/exceptions", Some(&admin), Some(body)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let exception = body_json(response).await;
    assert_eq!(exception["is_effective"], true);
    assert_eq!(exception["created_by"], "alice");

    send(&app, request("POST", "/validation/run", Some(&admin), None)).await;

    let list = body_json(
        send(&app, request("GET", "/validation/issues", Some(&admin), None)).await,
    )
    .await;
    let issues = list["issues"].as_array().unwrap();
    assert!(!issues.is_empty());
    assert!(
        issues.iter().all(|i| i["entity_id"] != "g1"),
        "issues on g1 must be suppressed"
    );
    assert!(issues.iter().any(|i| i["entity_id"] == "g2"));
}

#[tokio::test]
async fn exception_with_past_expiry_is_rejected() {
    let app = app();
    let admin = token_for("t1", "alice", Some(Role::Admin));
    let body = format!(
        r#"{{"entity_type":"process","entity_id":"g1","reason":"late","expires_at":{}}}"#,
        now_epoch_secs() - 60
    );
    let response = send(
        &app,
        request("POST", "/validation/exceptions", Some(&admin), Some(&body)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ─── Scorecards & matrix ─────────────────────────────────────────────

#[tokio::test]
async fn scorecard_is_404_until_a_cycle_completes() {
    let app = app();
    let admin = token_for("t1", "alice", Some(Role::Admin));

    let response = send(&app, request("GET", "/validation/scorecard", Some(&admin), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    send(&app, request("POST", "/validation/run", Some(&admin), None)).await;

    let response = send(&app, request("GET", "/validation/scorecard", Some(&admin), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let scorecard = body_json(response).await;
    assert_eq!(scorecard["maturity_score"], 1.0);
    assert_eq!(scorecard["layers"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn matrix_rejects_unknown_layer_filters() {
    let app = app();
    let viewer = token_for("t1", "bob", None);
    let response = send(
        &app,
        request(
            "GET",
            "/validation/traceability-matrix?source_layer=Basement",
            Some(&viewer),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ─── Rules ───────────────────────────────────────────────────────────

#[tokio::test]
async fn builtin_rules_are_listed() {
    let app = app();
    let viewer = token_for("t1", "bob", None);
    let response = send(&app, request("GET", "/validation/rules", Some(&viewer), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert!(list["rules"].as_array().unwrap().len() >= 5);
}

#[tokio::test]
async fn toggling_an_unknown_rule_is_404() {
    let app = app();
    let admin = token_for("t1", "alice", Some(Role::Admin));
    let response = send(
        &app,
        request(
            "PATCH",
            "/validation/rules/no-such-rule",
            Some(&admin),
            Some(r#"{"is_active":false}"#),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn toggle_round_trip_restores_state_without_touching_issues() {
    let app = app();
    let admin = token_for("t1", "alice", Some(Role::Admin));
    seed_business_process(&app, &admin, "proc-1").await;
    send(&app, request("POST", "/validation/run", Some(&admin), None)).await;
    let before = body_json(
        send(&app, request("GET", "/validation/issues", Some(&admin), None)).await,
    )
    .await;

    let uri = "/validation/rules/builtin-business-owner-assigned";
    let off = body_json(
        send(&app, request("PATCH", uri, Some(&admin), Some(r#"{"is_active":false}"#))).await,
    )
    .await;
    assert_eq!(off["is_active"], false);
    let on = body_json(
        send(&app, request("PATCH", uri, Some(&admin), Some(r#"{"is_active":true}"#))).await,
    )
    .await;
    assert_eq!(on["is_active"], true);

    let after = body_json(
        send(&app, request("GET", "/validation/issues", Some(&admin), None)).await,
    )
    .await;
    assert_eq!(before["total"], after["total"]);
}

#[tokio::test]
async fn creating_a_rule_validates_its_logic() {
    let app = app();
    let admin = token_for("t1", "alice", Some(Role::Admin));

    let bad = r#"{"name":"x","rule_type":"completeness","scope":"Business","severity":"low","rule_logic":{"kind":"frobnicate"}}"#;
    let response = send(
        &app,
        request("POST", "/validation/rules", Some(&admin), Some(bad)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let good = r#"{"name":"motivation-connected","rule_type":"completeness","scope":"Motivation","severity":"low","rule_logic":{"kind":"require_any_relationship"}}"#;
    let response = send(
        &app,
        request("POST", "/validation/rules", Some(&admin), Some(good)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate names are rejected.
    let response = send(
        &app,
        request("POST", "/validation/rules", Some(&admin), Some(good)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn viewers_cannot_mutate_rules() {
    let app = app();
    let viewer = token_for("t1", "bob", None);
    let response = send(
        &app,
        request(
            "PATCH",
            "/validation/rules/builtin-application-connected",
            Some(&viewer),
            Some(r#"{"is_active":false}"#),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ─── Health & metrics ────────────────────────────────────────────────

#[tokio::test]
async fn health_and_metrics_are_open() {
    let app = app();
    let response = send(&app, request("GET", "/validation/health", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "ok");

    let response = send(&app, request("GET", "/validation/metrics", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let metrics = body_json(response).await;
    assert!(metrics["requests"].as_u64().unwrap() >= 1);
}
