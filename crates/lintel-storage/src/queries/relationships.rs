//! Queries for element_relationships.

use lintel_core::errors::StorageError;
use rusqlite::{params, Connection};

/// A directed relationship between two elements of the same tenant.
#[derive(Debug, Clone)]
pub struct RelationshipRow {
    pub id: String,
    pub tenant_id: String,
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: String,
    pub created_at: i64,
}

/// Insert a relationship. Fails if the endpoints belong to another tenant.
pub fn insert_relationship(conn: &Connection, r: &RelationshipRow) -> Result<(), StorageError> {
    let endpoints: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM architecture_elements
             WHERE tenant_id = ?1 AND id IN (?2, ?3)",
            params![r.tenant_id, r.source_id, r.target_id],
            |row| row.get(0),
        )
        .map_err(StorageError::sqlite)?;
    let expected = if r.source_id == r.target_id { 1 } else { 2 };
    if endpoints != expected {
        return Err(StorageError::NotFound {
            entity: "architecture_element",
            id: format!("{} -> {}", r.source_id, r.target_id),
        });
    }

    conn.execute(
        "INSERT OR REPLACE INTO element_relationships
            (id, tenant_id, source_id, target_id, relationship_type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            r.id,
            r.tenant_id,
            r.source_id,
            r.target_id,
            r.relationship_type,
            r.created_at
        ],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

/// Query all relationships for a tenant.
pub fn query_by_tenant(
    conn: &Connection,
    tenant_id: &str,
) -> Result<Vec<RelationshipRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, tenant_id, source_id, target_id, relationship_type, created_at
             FROM element_relationships WHERE tenant_id = ?1",
        )
        .map_err(StorageError::sqlite)?;

    let rows = stmt
        .query_map(params![tenant_id], |row| {
            Ok(RelationshipRow {
                id: row.get(0)?,
                tenant_id: row.get(1)?,
                source_id: row.get(2)?,
                target_id: row.get(3)?,
                relationship_type: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .map_err(StorageError::sqlite)?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StorageError::sqlite)
}
