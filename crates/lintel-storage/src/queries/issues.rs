//! Queries for validation_issues.

use lintel_core::errors::StorageError;
use rusqlite::{params, Connection};

use crate::pagination::{Page, PageParams};

/// A validation issue row.
#[derive(Debug, Clone)]
pub struct IssueRow {
    pub id: String,
    pub tenant_id: String,
    pub cycle_id: Option<i64>,
    pub entity_type: String,
    pub entity_id: String,
    pub rule_id: Option<String>,
    pub issue_type: String,
    pub severity: String,
    pub description: String,
    pub recommended_fix: Option<String>,
    pub metadata: String,
    pub is_resolved: bool,
    pub resolved_at: Option<i64>,
    pub resolved_by: Option<String>,
    pub created_at: i64,
}

/// Unresolved-issue counts per severity for one tenant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

impl SeverityCounts {
    pub fn total(&self) -> u32 {
        self.low + self.medium + self.high + self.critical
    }
}

const ISSUE_COLUMNS: &str = "id, tenant_id, cycle_id, entity_type, entity_id, rule_id, issue_type,
     severity, description, recommended_fix, metadata, is_resolved,
     resolved_at, resolved_by, created_at";

fn map_issue_row(row: &rusqlite::Row) -> rusqlite::Result<IssueRow> {
    Ok(IssueRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        cycle_id: row.get(2)?,
        entity_type: row.get(3)?,
        entity_id: row.get(4)?,
        rule_id: row.get(5)?,
        issue_type: row.get(6)?,
        severity: row.get(7)?,
        description: row.get(8)?,
        recommended_fix: row.get(9)?,
        metadata: row.get(10)?,
        is_resolved: row.get::<_, i32>(11)? != 0,
        resolved_at: row.get(12)?,
        resolved_by: row.get(13)?,
        created_at: row.get(14)?,
    })
}

/// Insert an issue. `INSERT OR REPLACE` keyed on the deterministic
/// composite id keeps a re-run of the same cycle idempotent.
pub fn insert_issue(conn: &Connection, i: &IssueRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO validation_issues
            (id, tenant_id, cycle_id, entity_type, entity_id, rule_id, issue_type,
             severity, description, recommended_fix, metadata, is_resolved,
             resolved_at, resolved_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            i.id,
            i.tenant_id,
            i.cycle_id,
            i.entity_type,
            i.entity_id,
            i.rule_id,
            i.issue_type,
            i.severity,
            i.description,
            i.recommended_fix,
            i.metadata,
            i.is_resolved as i32,
            i.resolved_at,
            i.resolved_by,
            i.created_at
        ],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

/// Newest-first page of a tenant's issues.
pub fn query_page(
    conn: &Connection,
    tenant_id: &str,
    page: PageParams,
) -> Result<Page<IssueRow>, StorageError> {
    let total: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM validation_issues WHERE tenant_id = ?1",
            params![tenant_id],
            |row| row.get(0),
        )
        .map_err(StorageError::sqlite)?;

    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {ISSUE_COLUMNS} FROM validation_issues
             WHERE tenant_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
        ))
        .map_err(StorageError::sqlite)?;

    let rows = stmt
        .query_map(params![tenant_id, page.limit(), page.skip], map_issue_row)
        .map_err(StorageError::sqlite)?;

    let items = rows
        .collect::<Result<Vec<_>, _>>()
        .map_err(StorageError::sqlite)?;

    Ok(Page::new(items, total as u64, page))
}

/// All issues belonging to one cycle, tenant-scoped.
pub fn query_by_cycle(
    conn: &Connection,
    tenant_id: &str,
    cycle_id: i64,
) -> Result<Vec<IssueRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {ISSUE_COLUMNS} FROM validation_issues
             WHERE tenant_id = ?1 AND cycle_id = ?2 ORDER BY created_at DESC, id DESC"
        ))
        .map_err(StorageError::sqlite)?;

    let rows = stmt
        .query_map(params![tenant_id, cycle_id], map_issue_row)
        .map_err(StorageError::sqlite)?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StorageError::sqlite)
}

/// Unresolved-issue counts per severity over the whole tenant.
pub fn severity_counts(conn: &Connection, tenant_id: &str) -> Result<SeverityCounts, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT severity, COUNT(*) FROM validation_issues
             WHERE tenant_id = ?1 AND is_resolved = 0 GROUP BY severity",
        )
        .map_err(StorageError::sqlite)?;

    let rows = stmt
        .query_map(params![tenant_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })
        .map_err(StorageError::sqlite)?;

    let mut counts = SeverityCounts::default();
    for row in rows {
        let (severity, count) = row.map_err(StorageError::sqlite)?;
        match severity.as_str() {
            "low" => counts.low = count,
            "medium" => counts.medium = count,
            "high" => counts.high = count,
            "critical" => counts.critical = count,
            _ => {}
        }
    }
    Ok(counts)
}

/// Mark an issue resolved. Idempotent: an already-resolved issue is left
/// untouched (`resolved_at` keeps its original value) and the stored row
/// is returned either way. NotFound for an unknown or cross-tenant id.
pub fn resolve_issue(
    conn: &Connection,
    tenant_id: &str,
    issue_id: &str,
    resolved_by: &str,
    resolved_at: i64,
) -> Result<IssueRow, StorageError> {
    conn.execute(
        "UPDATE validation_issues
         SET is_resolved = 1, resolved_at = ?1, resolved_by = ?2
         WHERE tenant_id = ?3 AND id = ?4 AND is_resolved = 0",
        params![resolved_at, resolved_by, tenant_id, issue_id],
    )
    .map_err(StorageError::sqlite)?;

    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {ISSUE_COLUMNS} FROM validation_issues WHERE tenant_id = ?1 AND id = ?2"
        ))
        .map_err(StorageError::sqlite)?;

    let result = stmt.query_row(params![tenant_id, issue_id], map_issue_row);
    match result {
        Ok(row) => Ok(row),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NotFound {
            entity: "validation_issue",
            id: issue_id.to_string(),
        }),
        Err(e) => Err(StorageError::sqlite(e)),
    }
}
