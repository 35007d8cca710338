//! End-to-end cycle runner tests against an in-memory database with the
//! seeded built-in rule set.

use std::sync::Arc;
use std::time::Duration;

use lintel_core::events::EventDispatcher;
use lintel_core::time::now_epoch_secs;
use lintel_core::traits::{Cancellable, CancellationToken};
use lintel_engine::CycleRunner;
use lintel_storage::pagination::PageParams;
use lintel_storage::queries::{elements, exceptions, issues, relationships, scorecards};
use lintel_storage::DatabaseManager;

fn runner(db: &Arc<DatabaseManager>) -> CycleRunner {
    CycleRunner::new(
        db.clone(),
        Arc::new(EventDispatcher::new()),
        Duration::from_secs(30),
    )
}

fn seed_element(db: &DatabaseManager, tenant_id: &str, id: &str, layer: &str, entity_type: &str) {
    let now = now_epoch_secs();
    db.with_writer(|conn| {
        elements::upsert_element(
            conn,
            &elements::ElementRow {
                id: id.to_string(),
                tenant_id: tenant_id.to_string(),
                layer: layer.to_string(),
                entity_type: entity_type.to_string(),
                name: id.to_string(),
                attributes: "{}".to_string(),
                created_at: now,
                updated_at: now,
            },
        )
    })
    .unwrap();
}

#[test]
fn empty_tenant_completes_with_no_issues_and_full_maturity() {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());
    let cycle = runner(&db)
        .run("t1", "alice", None, &CancellationToken::new())
        .unwrap();

    assert_eq!(cycle.execution_status, "completed");
    assert_eq!(cycle.total_issues_found, Some(0));
    assert_eq!(cycle.maturity_score, Some(1.0));
    assert!(cycle.completed_at.is_some());

    // One scorecard per layer, all perfect.
    let cards = db
        .with_reader(|conn| scorecards::query_by_cycle(conn, "t1", cycle.id))
        .unwrap();
    assert_eq!(cards.len(), 5);
    assert!(cards.iter().all(|c| c.overall_score == 1.0));
}

#[test]
fn disconnected_business_element_is_flagged() {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());
    // A Business process with no relationships and no owner trips the
    // built-in realization and owner rules.
    seed_element(&db, "t1", "proc-1", "Business", "process");

    let cycle = runner(&db)
        .run("t1", "alice", None, &CancellationToken::new())
        .unwrap();

    assert_eq!(cycle.execution_status, "completed");
    let found = cycle.total_issues_found.unwrap();
    assert!(found >= 2, "expected at least 2 issues, got {found}");
    assert!(cycle.maturity_score.unwrap() < 1.0);

    let page = db
        .with_reader(|conn| issues::query_page(conn, "t1", PageParams::default()))
        .unwrap();
    assert_eq!(page.total, found as u64);
    assert!(page.items.iter().all(|i| i.tenant_id == "t1"));
    assert!(page.items.iter().all(|i| i.cycle_id == Some(cycle.id)));
}

#[test]
fn entity_wide_exception_suppresses_every_issue_on_that_entity() {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());
    seed_element(&db, "t1", "g1", "Business", "goal");
    seed_element(&db, "t1", "g2", "Business", "goal");

    // Accept all gaps on g1, with no rule_id and no expiry.
    db.with_writer(|conn| {
        exceptions::insert_exception(
            conn,
            &exceptions::ExceptionRow {
                id: "exc-1".to_string(),
                tenant_id: "t1".to_string(),
                entity_type: "goal".to_string(),
                entity_id: "g1".to_string(),
                rule_id: None,
                reason: "legacy goal, retiring next quarter".to_string(),
                created_by: "admin".to_string(),
                expires_at: None,
                is_active: true,
                created_at: now_epoch_secs(),
            },
        )
    })
    .unwrap();

    let cycle = runner(&db)
        .run("t1", "alice", None, &CancellationToken::new())
        .unwrap();
    assert_eq!(cycle.execution_status, "completed");

    let page = db
        .with_reader(|conn| issues::query_page(conn, "t1", PageParams::default()))
        .unwrap();
    assert!(
        page.items.iter().all(|i| i.entity_id != "g1"),
        "issues on g1 must be suppressed"
    );
    assert!(
        page.items.iter().any(|i| i.entity_id == "g2"),
        "g2 is not excepted and must still be flagged"
    );
}

#[test]
fn expired_exception_does_not_suppress() {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());
    seed_element(&db, "t1", "g1", "Business", "goal");

    db.with_writer(|conn| {
        exceptions::insert_exception(
            conn,
            &exceptions::ExceptionRow {
                id: "exc-lapsed".to_string(),
                tenant_id: "t1".to_string(),
                entity_type: "goal".to_string(),
                entity_id: "g1".to_string(),
                rule_id: None,
                reason: "was accepted, has lapsed".to_string(),
                created_by: "admin".to_string(),
                expires_at: Some(now_epoch_secs() - 3600),
                is_active: true, // stale flag, must not matter
                created_at: 0,
            },
        )
    })
    .unwrap();

    let cycle = runner(&db)
        .run("t1", "alice", None, &CancellationToken::new())
        .unwrap();
    assert!(cycle.total_issues_found.unwrap() > 0);

    let page = db
        .with_reader(|conn| issues::query_page(conn, "t1", PageParams::default()))
        .unwrap();
    assert!(page.items.iter().any(|i| i.entity_id == "g1"));
}

#[test]
fn cycles_are_tenant_isolated() {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());
    seed_element(&db, "tenant-a", "a1", "Business", "process");
    seed_element(&db, "tenant-b", "b1", "Business", "process");

    let cycle_a = runner(&db)
        .run("tenant-a", "alice", None, &CancellationToken::new())
        .unwrap();
    assert_eq!(cycle_a.tenant_id, "tenant-a");

    // Tenant B never ran a cycle; its issue list stays empty.
    let page_b = db
        .with_reader(|conn| issues::query_page(conn, "tenant-b", PageParams::default()))
        .unwrap();
    assert_eq!(page_b.total, 0);

    // And tenant A's issues all reference tenant A elements.
    let page_a = db
        .with_reader(|conn| issues::query_page(conn, "tenant-a", PageParams::default()))
        .unwrap();
    assert!(page_a.items.iter().all(|i| i.entity_id == "a1"));
}

#[test]
fn cancelled_token_yields_cancelled_terminal_state() {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());
    seed_element(&db, "t1", "e1", "Business", "process");

    let token = CancellationToken::new();
    token.cancel();

    let cycle = runner(&db).run("t1", "alice", None, &token).unwrap();
    assert_eq!(cycle.execution_status, "cancelled");
    assert!(cycle.maturity_score.is_none());
    assert_eq!(cycle.total_issues_found, Some(0));
}

#[test]
fn zero_timeout_yields_failed_terminal_state() {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());
    seed_element(&db, "t1", "e1", "Business", "process");

    let runner = CycleRunner::new(
        db.clone(),
        Arc::new(EventDispatcher::new()),
        Duration::from_secs(0),
    );
    let cycle = runner.run("t1", "alice", None, &CancellationToken::new()).unwrap();
    assert_eq!(cycle.execution_status, "failed");
    assert!(cycle.error.as_deref().unwrap_or("").contains("timed out"));
}

#[test]
fn rerun_produces_fresh_cycle_scoped_issues() {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());
    seed_element(&db, "t1", "proc-1", "Business", "process");

    let first = runner(&db)
        .run("t1", "alice", None, &CancellationToken::new())
        .unwrap();
    let second = runner(&db)
        .run("t1", "alice", None, &CancellationToken::new())
        .unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.total_issues_found, second.total_issues_found);

    let first_issues = db
        .with_reader(|conn| issues::query_by_cycle(conn, "t1", first.id))
        .unwrap();
    let second_issues = db
        .with_reader(|conn| issues::query_by_cycle(conn, "t1", second.id))
        .unwrap();
    assert_eq!(first_issues.len(), second_issues.len());
}

#[test]
fn relationships_feed_the_matrix() {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());
    seed_element(&db, "t1", "svc", "Application", "service");
    seed_element(&db, "t1", "node", "Technology", "node");
    let now = now_epoch_secs();
    db.with_writer(|conn| {
        relationships::insert_relationship(
            conn,
            &relationships::RelationshipRow {
                id: "r1".to_string(),
                tenant_id: "t1".to_string(),
                source_id: "svc".to_string(),
                target_id: "node".to_string(),
                relationship_type: "deployed_on".to_string(),
                created_at: now,
            },
        )
    })
    .unwrap();

    runner(&db)
        .run("t1", "alice", None, &CancellationToken::new())
        .unwrap();

    let rows = db
        .with_reader(|conn| {
            lintel_storage::queries::matrix::query_matrix(conn, "t1", None, None)
        })
        .unwrap();
    assert!(!rows.is_empty());
    let deployed = rows
        .iter()
        .find(|r| r.relationship_type == "deployed_on")
        .unwrap();
    assert_eq!(deployed.source_layer, "Application");
    assert_eq!(deployed.target_layer, "Technology");
    assert_eq!(deployed.connection_count, 1);
    assert_eq!(deployed.strength_score, 1.0);
}
