//! Connection management: write-serialized + read-pooled.

pub mod interrupt;
pub mod pool;
pub mod pragmas;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use gramlens_core::config::StorageConfig;
use gramlens_core::errors::StorageError;
use rusqlite::Connection;

use self::pool::ReadPool;
use self::pragmas::apply_pragmas;
use crate::{migrations, to_storage_err};

/// Manages the single write connection and the read connection pool.
///
/// In-memory databases have no pool: every read goes through the writer so
/// that readers see the same data.
pub struct DatabaseManager {
    writer: Mutex<Connection>,
    readers: Option<ReadPool>,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open the store described by `config`, in memory when no path is set.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        match config.effective_db_path() {
            Some(path) => Self::open_with(
                &path,
                config.effective_read_pool_size(),
                Duration::from_millis(config.effective_busy_timeout_ms()),
            ),
            None => Self::open_in_memory(),
        }
    }

    /// Open a database at the given path with default settings.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::from_config(&StorageConfig {
            db_path: Some(path.display().to_string()),
            ..Default::default()
        })
    }

    /// Open a database file, apply pragmas, run migrations, then open readers.
    pub fn open_with(
        path: &Path,
        read_pool_size: usize,
        busy_timeout: Duration,
    ) -> Result<Self, StorageError> {
        let writer = Connection::open(path).map_err(|e| StorageError::Unreachable {
            message: format!("{}: {e}", path.display()),
        })?;
        apply_pragmas(&writer, busy_timeout)?;
        migrations::run_migrations(&writer)?;

        let readers = ReadPool::open(path, read_pool_size, busy_timeout)?;
        tracing::info!(path = %path.display(), readers = readers.size(), "corpus store opened");

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Some(readers),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory().map_err(to_storage_err)?;
        apply_pragmas(
            &writer,
            Duration::from_millis(gramlens_core::constants::DEFAULT_BUSY_TIMEOUT_MS),
        )?;
        migrations::run_migrations(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: None,
            path: None,
        })
    }

    /// Execute a write operation with the serialized writer connection.
    pub fn with_writer<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Connection) -> Result<T, E>,
        E: From<StorageError>,
    {
        let mut guard = self.writer.lock().map_err(|_| StorageError::SqliteError {
            message: "write lock poisoned".to_string(),
        })?;
        f(&mut guard)
    }

    /// Execute a read operation with a pooled read connection.
    pub fn with_reader<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<StorageError>,
    {
        match &self.readers {
            Some(pool) => pool.with_conn(f),
            None => self.with_writer(|conn| f(conn)),
        }
    }

    /// Run a WAL checkpoint (TRUNCATE mode).
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(to_storage_err)
        })
    }

    /// Get the database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_runs_in_wal_mode() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = DatabaseManager::open(&dir.path().join("corpus.db")).unwrap();
        let wal = db
            .with_writer(|conn| pragmas::verify_wal_mode(conn))
            .unwrap();
        assert!(wal);
        assert!(!db.is_in_memory());
    }

    #[test]
    fn in_memory_reads_see_writes() {
        let db = DatabaseManager::open_in_memory().unwrap();
        db.with_writer(|conn| {
            conn.execute("INSERT INTO saved_filters (name, filters_json) VALUES ('a', '{}')", [])
                .map_err(to_storage_err)
        })
        .unwrap();
        let n: i64 = db
            .with_reader(|conn| {
                conn.query_row("SELECT COUNT(*) FROM saved_filters", [], |r| r.get(0))
                    .map_err(to_storage_err)
            })
            .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn missing_directory_is_unreachable() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("no/such/dir/corpus.db");
        assert!(matches!(
            DatabaseManager::open(&path),
            Err(StorageError::Unreachable { .. })
        ));
    }
}
