//! Queries for validation_exceptions.

use lintel_core::errors::StorageError;
use rusqlite::{params, Connection};

/// An exception row: an approved suppression of an otherwise-flagged gap.
#[derive(Debug, Clone)]
pub struct ExceptionRow {
    pub id: String,
    pub tenant_id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub rule_id: Option<String>,
    pub reason: String,
    pub created_by: String,
    pub expires_at: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
}

const EXCEPTION_COLUMNS: &str = "id, tenant_id, entity_type, entity_id, rule_id, reason,
     created_by, expires_at, is_active, created_at";

fn map_exception_row(row: &rusqlite::Row) -> rusqlite::Result<ExceptionRow> {
    Ok(ExceptionRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        entity_type: row.get(2)?,
        entity_id: row.get(3)?,
        rule_id: row.get(4)?,
        reason: row.get(5)?,
        created_by: row.get(6)?,
        expires_at: row.get(7)?,
        is_active: row.get::<_, i32>(8)? != 0,
        created_at: row.get(9)?,
    })
}

/// Insert an exception.
pub fn insert_exception(conn: &Connection, e: &ExceptionRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO validation_exceptions
            (id, tenant_id, entity_type, entity_id, rule_id, reason,
             created_by, expires_at, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            e.id,
            e.tenant_id,
            e.entity_type,
            e.entity_id,
            e.rule_id,
            e.reason,
            e.created_by,
            e.expires_at,
            e.is_active as i32,
            e.created_at
        ],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

/// All exceptions for a tenant, newest first.
pub fn query_by_tenant(
    conn: &Connection,
    tenant_id: &str,
) -> Result<Vec<ExceptionRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {EXCEPTION_COLUMNS} FROM validation_exceptions
             WHERE tenant_id = ?1 ORDER BY created_at DESC, id DESC"
        ))
        .map_err(StorageError::sqlite)?;

    let rows = stmt
        .query_map(params![tenant_id], map_exception_row)
        .map_err(StorageError::sqlite)?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StorageError::sqlite)
}

/// Exceptions that can suppress issues right now: flagged active AND
/// (no expiry OR expiry in the future). The expired-but-still-flagged
/// case is filtered here so every caller gets the reconciled view.
pub fn query_effective(
    conn: &Connection,
    tenant_id: &str,
    now: i64,
) -> Result<Vec<ExceptionRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {EXCEPTION_COLUMNS} FROM validation_exceptions
             WHERE tenant_id = ?1 AND is_active = 1
               AND (expires_at IS NULL OR expires_at > ?2)"
        ))
        .map_err(StorageError::sqlite)?;

    let rows = stmt
        .query_map(params![tenant_id, now], map_exception_row)
        .map_err(StorageError::sqlite)?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StorageError::sqlite)
}
