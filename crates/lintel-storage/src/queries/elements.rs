//! Queries for architecture_elements — the material the evaluator scans.

use lintel_core::errors::StorageError;
use rusqlite::{params, Connection};

/// An architecture element row.
#[derive(Debug, Clone)]
pub struct ElementRow {
    pub id: String,
    pub tenant_id: String,
    pub layer: String,
    pub entity_type: String,
    pub name: String,
    pub attributes: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Insert or replace an element. Upsert keyed on id keeps re-ingestion
/// idempotent.
pub fn upsert_element(conn: &Connection, e: &ElementRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO architecture_elements
            (id, tenant_id, layer, entity_type, name, attributes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            layer = excluded.layer,
            entity_type = excluded.entity_type,
            name = excluded.name,
            attributes = excluded.attributes,
            updated_at = excluded.updated_at",
        params![
            e.id,
            e.tenant_id,
            e.layer,
            e.entity_type,
            e.name,
            e.attributes,
            e.created_at,
            e.updated_at
        ],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

/// Query all elements for a tenant.
pub fn query_by_tenant(conn: &Connection, tenant_id: &str) -> Result<Vec<ElementRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, tenant_id, layer, entity_type, name, attributes, created_at, updated_at
             FROM architecture_elements WHERE tenant_id = ?1 ORDER BY layer, entity_type, id",
        )
        .map_err(StorageError::sqlite)?;

    let rows = stmt
        .query_map(params![tenant_id], |row| {
            Ok(ElementRow {
                id: row.get(0)?,
                tenant_id: row.get(1)?,
                layer: row.get(2)?,
                entity_type: row.get(3)?,
                name: row.get(4)?,
                attributes: row.get(5)?,
                created_at: row.get(6)?,
                updated_at: row.get(7)?,
            })
        })
        .map_err(StorageError::sqlite)?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StorageError::sqlite)
}

/// Count a tenant's elements.
pub fn count_by_tenant(conn: &Connection, tenant_id: &str) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM architecture_elements WHERE tenant_id = ?1",
        params![tenant_id],
        |row| row.get(0),
    )
    .map_err(StorageError::sqlite)
}
