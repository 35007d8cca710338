//! Queries for traceability_matrix — overwritten per cycle.

use lintel_core::errors::StorageError;
use rusqlite::{params, Connection};

/// One matrix cell: a (layer pair, type pair, relationship) summary.
#[derive(Debug, Clone)]
pub struct MatrixRow {
    pub tenant_id: String,
    pub source_layer: String,
    pub target_layer: String,
    pub source_entity_type: String,
    pub target_entity_type: String,
    pub relationship_type: String,
    pub connection_count: u32,
    pub missing_connections: u32,
    pub strength_score: f64,
    pub computed_at: i64,
}

const MATRIX_COLUMNS: &str = "tenant_id, source_layer, target_layer, source_entity_type,
     target_entity_type, relationship_type, connection_count,
     missing_connections, strength_score, computed_at";

fn map_matrix_row(row: &rusqlite::Row) -> rusqlite::Result<MatrixRow> {
    Ok(MatrixRow {
        tenant_id: row.get(0)?,
        source_layer: row.get(1)?,
        target_layer: row.get(2)?,
        source_entity_type: row.get(3)?,
        target_entity_type: row.get(4)?,
        relationship_type: row.get(5)?,
        connection_count: row.get(6)?,
        missing_connections: row.get(7)?,
        strength_score: row.get(8)?,
        computed_at: row.get(9)?,
    })
}

/// Replace a tenant's entire matrix with a freshly computed one.
/// Runs as delete-then-insert inside the caller's transaction.
pub fn replace_matrix(
    conn: &Connection,
    tenant_id: &str,
    rows: &[MatrixRow],
) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM traceability_matrix WHERE tenant_id = ?1",
        params![tenant_id],
    )
    .map_err(StorageError::sqlite)?;

    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO traceability_matrix
                (tenant_id, source_layer, target_layer, source_entity_type,
                 target_entity_type, relationship_type, connection_count,
                 missing_connections, strength_score, computed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .map_err(StorageError::sqlite)?;

    for r in rows {
        stmt.execute(params![
            r.tenant_id,
            r.source_layer,
            r.target_layer,
            r.source_entity_type,
            r.target_entity_type,
            r.relationship_type,
            r.connection_count,
            r.missing_connections,
            r.strength_score,
            r.computed_at
        ])
        .map_err(StorageError::sqlite)?;
    }
    Ok(())
}

/// Query a tenant's matrix with optional layer filters.
pub fn query_matrix(
    conn: &Connection,
    tenant_id: &str,
    source_layer: Option<&str>,
    target_layer: Option<&str>,
) -> Result<Vec<MatrixRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {MATRIX_COLUMNS} FROM traceability_matrix
             WHERE tenant_id = ?1
               AND (?2 IS NULL OR source_layer = ?2)
               AND (?3 IS NULL OR target_layer = ?3)
             ORDER BY source_layer, target_layer, source_entity_type,
                      target_entity_type, relationship_type"
        ))
        .map_err(StorageError::sqlite)?;

    let rows = stmt
        .query_map(params![tenant_id, source_layer, target_layer], map_matrix_row)
        .map_err(StorageError::sqlite)?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StorageError::sqlite)
}
