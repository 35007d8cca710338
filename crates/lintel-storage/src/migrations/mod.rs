//! Numbered schema migrations, tracked via `PRAGMA user_version`.
//!
//! Each migration is a batch of idempotent SQL; the version bump and the
//! batch run inside one transaction so a failed migration leaves the
//! database at the previous version.

pub mod v001_initial;
pub mod v002_default_rules;

use lintel_core::errors::StorageError;
use rusqlite::Connection;

const MIGRATIONS: &[(i64, &str)] = &[
    (1, v001_initial::MIGRATION_SQL),
    (2, v002_default_rules::MIGRATION_SQL),
];

/// Apply all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(StorageError::sqlite)?;

    for &(version, sql) in MIGRATIONS {
        if version <= current {
            continue;
        }
        tracing::debug!(version, "applying migration");

        conn.execute_batch("BEGIN")
            .map_err(StorageError::sqlite)?;
        let applied = conn
            .execute_batch(sql)
            .and_then(|()| conn.execute_batch(&format!("PRAGMA user_version = {version}")));
        match applied {
            Ok(()) => {
                conn.execute_batch("COMMIT").map_err(StorageError::sqlite)?;
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(StorageError::MigrationFailed {
                    version,
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Current schema version.
pub fn schema_version(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(StorageError::sqlite)
}
