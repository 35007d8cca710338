//! Data retention for lintel.db.
//!
//! Three cleanup tiers:
//! - **Resolved issues** (default 30 days after resolution): the gap is
//!   closed; the history of interest lives in cycles and scorecards.
//! - **Lapsed exceptions** (default 90 days after expiry): kept a while
//!   for audit, then purged.
//! - **Stale matrix rows** (default 30 days): the matrix is overwritten
//!   per cycle, so rows this old belong to tenants that stopped scanning.
//!
//! Cycles and scorecards are exempt: history is retained indefinitely.

use rusqlite::{params, Connection};
use serde::Serialize;

use lintel_core::config::RetentionConfig;
use lintel_core::errors::StorageError;
use lintel_core::time::{now_epoch_secs, SECS_PER_DAY};

/// Configurable retention periods.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    pub resolved_issue_days: u32,
    pub expired_exception_days: u32,
    pub matrix_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            resolved_issue_days: 30,
            expired_exception_days: 90,
            matrix_days: 30,
        }
    }
}

impl From<&RetentionConfig> for RetentionPolicy {
    fn from(config: &RetentionConfig) -> Self {
        Self {
            resolved_issue_days: config.resolved_issue_days(),
            expired_exception_days: config.expired_exception_days(),
            matrix_days: config.matrix_days(),
        }
    }
}

/// Report of what was cleaned.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetentionReport {
    pub total_deleted: u64,
    pub per_table: Vec<TableCleanup>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCleanup {
    pub table: String,
    pub deleted: u64,
}

/// Apply the full retention policy.
///
/// Runs inside a single transaction for atomicity.
/// Returns a report of how many rows were deleted per table.
pub fn apply_retention(
    conn: &Connection,
    policy: &RetentionPolicy,
) -> Result<RetentionReport, StorageError> {
    let start = std::time::Instant::now();
    let mut report = RetentionReport::default();

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StorageError::SqliteError {
            message: format!("retention begin: {e}"),
        })?;

    apply_retention_inner(&tx, policy, &mut report)?;

    tx.commit().map_err(StorageError::sqlite)?;

    report.duration_ms = start.elapsed().as_millis() as u64;
    report.total_deleted = report.per_table.iter().map(|t| t.deleted).sum();
    Ok(report)
}

fn apply_retention_inner(
    conn: &Connection,
    policy: &RetentionPolicy,
    report: &mut RetentionReport,
) -> Result<(), StorageError> {
    let now = now_epoch_secs();

    let issue_cutoff = now - policy.resolved_issue_days as i64 * SECS_PER_DAY;
    let exception_cutoff = now - policy.expired_exception_days as i64 * SECS_PER_DAY;
    let matrix_cutoff = now - policy.matrix_days as i64 * SECS_PER_DAY;

    record(
        report,
        "validation_issues",
        conn.execute(
            "DELETE FROM validation_issues WHERE is_resolved = 1 AND resolved_at < ?1",
            params![issue_cutoff],
        )
        .map_err(StorageError::sqlite)?,
    );

    record(
        report,
        "validation_exceptions",
        conn.execute(
            "DELETE FROM validation_exceptions
             WHERE expires_at IS NOT NULL AND expires_at < ?1",
            params![exception_cutoff],
        )
        .map_err(StorageError::sqlite)?,
    );

    record(
        report,
        "traceability_matrix",
        conn.execute(
            "DELETE FROM traceability_matrix WHERE computed_at < ?1",
            params![matrix_cutoff],
        )
        .map_err(StorageError::sqlite)?,
    );

    Ok(())
}

fn record(report: &mut RetentionReport, table: &str, deleted: usize) {
    if deleted > 0 {
        report.per_table.push(TableCleanup {
            table: table.to_string(),
            deleted: deleted as u64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run_migrations(&conn).unwrap();
        conn
    }

    fn insert_issue(conn: &Connection, id: &str, resolved: bool, resolved_at: Option<i64>) {
        conn.execute(
            "INSERT INTO validation_issues
                (id, tenant_id, entity_type, entity_id, issue_type, severity,
                 description, is_resolved, resolved_at, created_at)
             VALUES (?1, 't1', 'goal', 'g1', 'orphaned', 'low', 'd', ?2, ?3, 0)",
            params![id, resolved as i32, resolved_at],
        )
        .unwrap();
    }

    #[test]
    fn purges_only_old_resolved_issues() {
        let conn = setup_db();
        let now = now_epoch_secs();

        insert_issue(&conn, "old-resolved", true, Some(now - 60 * SECS_PER_DAY));
        insert_issue(&conn, "new-resolved", true, Some(now - SECS_PER_DAY));
        insert_issue(&conn, "open", false, None);

        let report = apply_retention(&conn, &RetentionPolicy::default()).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM validation_issues", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2, "only the old resolved issue should go");
        assert_eq!(report.total_deleted, 1);
    }

    #[test]
    fn purges_long_lapsed_exceptions() {
        let conn = setup_db();
        let now = now_epoch_secs();

        conn.execute(
            "INSERT INTO validation_exceptions
                (id, tenant_id, entity_type, entity_id, reason, created_by,
                 expires_at, is_active, created_at)
             VALUES ('lapsed', 't1', 'goal', 'g1', 'r', 'u', ?1, 1, 0)",
            params![now - 100 * SECS_PER_DAY],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO validation_exceptions
                (id, tenant_id, entity_type, entity_id, reason, created_by,
                 expires_at, is_active, created_at)
             VALUES ('open-ended', 't1', 'goal', 'g2', 'r', 'u', NULL, 1, 0)",
            [],
        )
        .unwrap();

        apply_retention(&conn, &RetentionPolicy::default()).unwrap();

        let remaining: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT id FROM validation_exceptions ORDER BY id")
                .unwrap();
            let rows = stmt.query_map([], |r| r.get(0)).unwrap();
            rows.collect::<Result<_, _>>().unwrap()
        };
        assert_eq!(remaining, vec!["open-ended".to_string()]);
    }

    #[test]
    fn never_touches_cycles_or_scorecards() {
        let conn = setup_db();

        conn.execute(
            "INSERT INTO validation_cycles
                (tenant_id, started_at, triggered_by, execution_status, completed_at)
             VALUES ('t1', 0, 'system', 'completed', 1)",
            [],
        )
        .unwrap();
        let cycle_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO validation_scorecards
                (tenant_id, cycle_id, layer, completeness_score, traceability_score,
                 alignment_score, overall_score, created_at)
             VALUES ('t1', ?1, 'Business', 1.0, 1.0, 1.0, 1.0, 0)",
            params![cycle_id],
        )
        .unwrap();

        let report = apply_retention(&conn, &RetentionPolicy::default()).unwrap();
        assert_eq!(report.total_deleted, 0);

        let cycles: i64 = conn
            .query_row("SELECT COUNT(*) FROM validation_cycles", [], |r| r.get(0))
            .unwrap();
        let scorecards: i64 = conn
            .query_row("SELECT COUNT(*) FROM validation_scorecards", [], |r| r.get(0))
            .unwrap();
        assert_eq!((cycles, scorecards), (1, 1));
    }

    #[test]
    fn empty_db_no_errors() {
        let conn = setup_db();
        let report = apply_retention(&conn, &RetentionPolicy::default()).unwrap();
        assert_eq!(report.total_deleted, 0);
    }
}
