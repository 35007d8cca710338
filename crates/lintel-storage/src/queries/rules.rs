//! Queries for validation_rules. Rules are global, not tenant-scoped.

use lintel_core::errors::StorageError;
use rusqlite::{params, Connection};

/// A validation rule row.
#[derive(Debug, Clone)]
pub struct RuleRow {
    pub id: String,
    pub name: String,
    pub rule_type: String,
    pub scope: String,
    pub rule_logic: String,
    pub severity: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

const RULE_COLUMNS: &str =
    "id, name, rule_type, scope, rule_logic, severity, is_active, created_at, updated_at";

fn map_rule_row(row: &rusqlite::Row) -> rusqlite::Result<RuleRow> {
    Ok(RuleRow {
        id: row.get(0)?,
        name: row.get(1)?,
        rule_type: row.get(2)?,
        scope: row.get(3)?,
        rule_logic: row.get(4)?,
        severity: row.get(5)?,
        is_active: row.get::<_, i32>(6)? != 0,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Insert a rule. The UNIQUE constraint on name surfaces as a sqlite error.
pub fn insert_rule(conn: &Connection, r: &RuleRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO validation_rules
            (id, name, rule_type, scope, rule_logic, severity, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            r.id,
            r.name,
            r.rule_type,
            r.scope,
            r.rule_logic,
            r.severity,
            r.is_active as i32,
            r.created_at,
            r.updated_at
        ],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

/// List all rules, active first, then by name.
pub fn query_all(conn: &Connection) -> Result<Vec<RuleRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {RULE_COLUMNS} FROM validation_rules ORDER BY is_active DESC, name"
        ))
        .map_err(StorageError::sqlite)?;

    let rows = stmt
        .query_map([], map_rule_row)
        .map_err(StorageError::sqlite)?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StorageError::sqlite)
}

/// List active rules only (the evaluator's working set).
pub fn query_active(conn: &Connection) -> Result<Vec<RuleRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {RULE_COLUMNS} FROM validation_rules WHERE is_active = 1 ORDER BY name"
        ))
        .map_err(StorageError::sqlite)?;

    let rows = stmt
        .query_map([], map_rule_row)
        .map_err(StorageError::sqlite)?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StorageError::sqlite)
}

/// Fetch one rule by id.
pub fn get_rule(conn: &Connection, rule_id: &str) -> Result<Option<RuleRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {RULE_COLUMNS} FROM validation_rules WHERE id = ?1"
        ))
        .map_err(StorageError::sqlite)?;

    let result = stmt.query_row(params![rule_id], map_rule_row);
    match result {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StorageError::sqlite(e)),
    }
}

/// Flip a rule's activation flag. NotFound for unknown ids. Never touches
/// issues the rule has already produced.
pub fn set_active(
    conn: &Connection,
    rule_id: &str,
    is_active: bool,
    updated_at: i64,
) -> Result<RuleRow, StorageError> {
    let updated = conn
        .execute(
            "UPDATE validation_rules SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            params![is_active as i32, updated_at, rule_id],
        )
        .map_err(StorageError::sqlite)?;

    if updated == 0 {
        return Err(StorageError::NotFound {
            entity: "validation_rule",
            id: rule_id.to_string(),
        });
    }

    get_rule(conn, rule_id)?.ok_or_else(|| StorageError::NotFound {
        entity: "validation_rule",
        id: rule_id.to_string(),
    })
}
