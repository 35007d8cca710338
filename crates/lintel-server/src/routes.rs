//! Route table.

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{cycles, elements, exceptions, health, issues, matrix, rules, scorecards};
use crate::state::AppState;

/// Build the service router. Health and metrics are unauthenticated;
/// everything else extracts an `AuthContext` and fails closed.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/validation/run", post(cycles::run_cycle))
        .route("/validation/history", get(cycles::history))
        .route("/validation/issues", get(issues::list_issues))
        .route("/validation/issues/{id}/resolve", post(issues::resolve_issue))
        .route("/validation/scorecard", get(scorecards::get_scorecard))
        .route("/validation/traceability-matrix", get(matrix::get_matrix))
        .route(
            "/validation/exceptions",
            post(exceptions::create_exception).get(exceptions::list_exceptions),
        )
        .route(
            "/validation/rules",
            get(rules::list_rules).post(rules::create_rule),
        )
        .route("/validation/rules/{id}", patch(rules::toggle_rule))
        .route("/validation/elements", post(elements::create_element))
        .route("/validation/relationships", post(elements::create_relationship))
        .route("/validation/health", get(health::health))
        .route("/validation/metrics", get(health::metrics))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            track_requests,
        ))
        .with_state(state)
}

async fn track_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    state.metrics.record_request();
    next.run(request).await
}
