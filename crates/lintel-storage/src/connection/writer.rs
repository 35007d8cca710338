//! Write connection utilities — BEGIN IMMEDIATE transactions.

use lintel_core::errors::StorageError;
use rusqlite::Connection;

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
/// This acquires the write lock at transaction start, preventing
/// SQLITE_BUSY upgrades mid-transaction.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
{
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to begin immediate transaction: {e}"),
        })?;

    // unchecked_transaction wraps the transaction opened above without
    // issuing another BEGIN; dropping it un-committed rolls back.
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to wrap transaction: {e}"),
        })?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| StorageError::SqliteError {
        message: format!("failed to commit: {e}"),
    })?;

    Ok(result)
}
