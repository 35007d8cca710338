//! Connection management: write-serialized + read-pooled.

pub mod pool;
pub mod pragmas;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lintel_core::errors::StorageError;
use rusqlite::Connection;

use self::pool::ReadPool;
use self::pragmas::apply_pragmas;
use crate::migrations;

/// Manages the single write connection and the read connection pool.
///
/// SQLite allows one writer at a time; serializing writes through a
/// mutex-guarded connection avoids SQLITE_BUSY storms under concurrent
/// HTTP handlers. Reads go through a small round-robin pool.
pub struct DatabaseManager {
    writer: Mutex<Connection>,
    readers: ReadPool,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open a database at the given path, apply pragmas, run migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let writer = Connection::open(path).map_err(StorageError::sqlite)?;
        apply_pragmas(&writer)?;
        migrations::run_migrations(&writer)?;

        let readers = ReadPool::open(path, ReadPool::default_size())?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    ///
    /// In-memory databases are private to one connection, so reads are
    /// served by the writer connection instead of a separate pool.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory().map_err(StorageError::sqlite)?;
        apply_pragmas(&writer)?;
        migrations::run_migrations(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: ReadPool::empty(),
            path: None,
        })
    }

    /// Execute a write operation with the serialized writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.writer.lock().map_err(|_| StorageError::SqliteError {
            message: "write lock poisoned".to_string(),
        })?;
        f(&guard)
    }

    /// Execute a read operation with a pooled read connection.
    /// Falls back to the writer connection for in-memory databases.
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        if self.readers.is_empty() {
            return self.with_writer(f);
        }
        self.readers.with_conn(f)
    }

    /// Run a WAL checkpoint (TRUNCATE mode) after cycle completion.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(StorageError::sqlite)
        })
    }

    /// Cheap connectivity probe for the health endpoint.
    pub fn ping(&self) -> Result<(), StorageError> {
        self.with_reader(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))
                .map_err(StorageError::sqlite)
        })
    }

    /// Get the database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
