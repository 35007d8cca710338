//! Queries for validation_cycles — append-only history of scan runs.

use lintel_core::errors::StorageError;
use rusqlite::{params, Connection};

use crate::pagination::{Page, PageParams};

/// A validation cycle row.
#[derive(Debug, Clone)]
pub struct CycleRow {
    pub id: i64,
    pub tenant_id: String,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub triggered_by: String,
    pub rule_set_id: Option<String>,
    pub total_issues_found: Option<i64>,
    pub execution_status: String,
    pub maturity_score: Option<f64>,
    pub error: Option<String>,
}

fn map_cycle_row(row: &rusqlite::Row) -> rusqlite::Result<CycleRow> {
    Ok(CycleRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        started_at: row.get(2)?,
        completed_at: row.get(3)?,
        triggered_by: row.get(4)?,
        rule_set_id: row.get(5)?,
        total_issues_found: row.get(6)?,
        execution_status: row.get(7)?,
        maturity_score: row.get(8)?,
        error: row.get(9)?,
    })
}

const CYCLE_COLUMNS: &str = "id, tenant_id, started_at, completed_at, triggered_by, rule_set_id,
     total_issues_found, execution_status, maturity_score, error";

/// Insert a new cycle (status = 'running'). Returns the row id.
pub fn insert_cycle_start(
    conn: &Connection,
    tenant_id: &str,
    started_at: i64,
    triggered_by: &str,
    rule_set_id: Option<&str>,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO validation_cycles (tenant_id, started_at, triggered_by, rule_set_id, execution_status)
         VALUES (?1, ?2, ?3, ?4, 'running')",
        params![tenant_id, started_at, triggered_by, rule_set_id],
    )
    .map_err(StorageError::sqlite)?;
    Ok(conn.last_insert_rowid())
}

/// Move a cycle to a terminal state. Guards on `running` so a terminal
/// state is never overwritten.
pub fn update_cycle_terminal(
    conn: &Connection,
    id: i64,
    completed_at: i64,
    total_issues_found: i64,
    status: &str,
    maturity_score: Option<f64>,
    error: Option<&str>,
) -> Result<(), StorageError> {
    let updated = conn
        .execute(
            "UPDATE validation_cycles SET
                completed_at = ?1, total_issues_found = ?2,
                execution_status = ?3, maturity_score = ?4, error = ?5
             WHERE id = ?6 AND execution_status = 'running'",
            params![completed_at, total_issues_found, status, maturity_score, error, id],
        )
        .map_err(StorageError::sqlite)?;
    if updated == 0 {
        return Err(StorageError::NotFound {
            entity: "running validation_cycle",
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Fetch a cycle by id, tenant-scoped.
pub fn get_cycle(
    conn: &Connection,
    tenant_id: &str,
    id: i64,
) -> Result<Option<CycleRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {CYCLE_COLUMNS} FROM validation_cycles WHERE tenant_id = ?1 AND id = ?2"
        ))
        .map_err(StorageError::sqlite)?;

    let result = stmt.query_row(params![tenant_id, id], map_cycle_row);
    match result {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StorageError::sqlite(e)),
    }
}

/// Most recent completed cycle for a tenant, if any.
pub fn latest_completed_cycle(
    conn: &Connection,
    tenant_id: &str,
) -> Result<Option<CycleRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {CYCLE_COLUMNS} FROM validation_cycles
             WHERE tenant_id = ?1 AND execution_status = 'completed'
             ORDER BY started_at DESC, id DESC LIMIT 1"
        ))
        .map_err(StorageError::sqlite)?;

    let result = stmt.query_row(params![tenant_id], map_cycle_row);
    match result {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StorageError::sqlite(e)),
    }
}

/// Newest-first page of a tenant's cycle history.
pub fn query_history(
    conn: &Connection,
    tenant_id: &str,
    page: PageParams,
) -> Result<Page<CycleRow>, StorageError> {
    let total: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM validation_cycles WHERE tenant_id = ?1",
            params![tenant_id],
            |row| row.get(0),
        )
        .map_err(StorageError::sqlite)?;

    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {CYCLE_COLUMNS} FROM validation_cycles
             WHERE tenant_id = ?1
             ORDER BY started_at DESC, id DESC LIMIT ?2 OFFSET ?3"
        ))
        .map_err(StorageError::sqlite)?;

    let rows = stmt
        .query_map(params![tenant_id, page.limit(), page.skip], map_cycle_row)
        .map_err(StorageError::sqlite)?;

    let items = rows
        .collect::<Result<Vec<_>, _>>()
        .map_err(StorageError::sqlite)?;

    Ok(Page::new(items, total as u64, page))
}

/// Average maturity score over a tenant's completed cycles.
pub fn average_maturity(conn: &Connection, tenant_id: &str) -> Result<Option<f64>, StorageError> {
    conn.query_row(
        "SELECT AVG(maturity_score) FROM validation_cycles
         WHERE tenant_id = ?1 AND execution_status = 'completed'",
        params![tenant_id],
        |row| row.get(0),
    )
    .map_err(StorageError::sqlite)
}
