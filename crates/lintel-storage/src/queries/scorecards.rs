//! Queries for validation_scorecards — immutable per (cycle, layer).

use lintel_core::errors::StorageError;
use rusqlite::{params, Connection};

/// A scorecard row.
#[derive(Debug, Clone)]
pub struct ScorecardRow {
    pub id: i64,
    pub tenant_id: String,
    pub cycle_id: i64,
    pub layer: String,
    pub completeness_score: f64,
    pub traceability_score: f64,
    pub alignment_score: f64,
    pub overall_score: f64,
    pub low_issues: u32,
    pub medium_issues: u32,
    pub high_issues: u32,
    pub critical_issues: u32,
    pub created_at: i64,
}

const SCORECARD_COLUMNS: &str = "id, tenant_id, cycle_id, layer, completeness_score,
     traceability_score, alignment_score, overall_score,
     low_issues, medium_issues, high_issues, critical_issues, created_at";

fn map_scorecard_row(row: &rusqlite::Row) -> rusqlite::Result<ScorecardRow> {
    Ok(ScorecardRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        cycle_id: row.get(2)?,
        layer: row.get(3)?,
        completeness_score: row.get(4)?,
        traceability_score: row.get(5)?,
        alignment_score: row.get(6)?,
        overall_score: row.get(7)?,
        low_issues: row.get(8)?,
        medium_issues: row.get(9)?,
        high_issues: row.get(10)?,
        critical_issues: row.get(11)?,
        created_at: row.get(12)?,
    })
}

/// Insert one layer's scorecard for a cycle. The UNIQUE(cycle_id, layer)
/// constraint enforces immutability: a second insert for the same pair
/// is an error, never an overwrite.
pub fn insert_scorecard(conn: &Connection, s: &ScorecardRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO validation_scorecards
            (tenant_id, cycle_id, layer, completeness_score, traceability_score,
             alignment_score, overall_score, low_issues, medium_issues,
             high_issues, critical_issues, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            s.tenant_id,
            s.cycle_id,
            s.layer,
            s.completeness_score,
            s.traceability_score,
            s.alignment_score,
            s.overall_score,
            s.low_issues,
            s.medium_issues,
            s.high_issues,
            s.critical_issues,
            s.created_at
        ],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

/// All layer scorecards for one cycle, tenant-scoped, in layer order.
pub fn query_by_cycle(
    conn: &Connection,
    tenant_id: &str,
    cycle_id: i64,
) -> Result<Vec<ScorecardRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {SCORECARD_COLUMNS} FROM validation_scorecards
             WHERE tenant_id = ?1 AND cycle_id = ?2 ORDER BY layer"
        ))
        .map_err(StorageError::sqlite)?;

    let rows = stmt
        .query_map(params![tenant_id, cycle_id], map_scorecard_row)
        .map_err(StorageError::sqlite)?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StorageError::sqlite)
}
