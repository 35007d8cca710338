//! Connection pragmas for write and read connections.

use lintel_core::errors::StorageError;
use rusqlite::Connection;

/// Pragmas for the write connection: WAL for concurrent readers,
/// NORMAL sync (durable enough with WAL), foreign keys on, and a busy
/// timeout so a checkpoint never turns into an immediate error.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA temp_store = MEMORY;",
    )
    .map_err(StorageError::sqlite)
}

/// Pragmas for read-only pool connections.
pub fn apply_read_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA query_only = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(StorageError::sqlite)
}
