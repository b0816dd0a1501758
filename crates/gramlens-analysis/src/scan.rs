//! Read scans bounded by a cancellation token and a shared deadline.

use std::time::{Duration, Instant};

use gramlens_core::errors::{AnalysisError, StorageError};
use gramlens_core::traits::{Cancellable, CancellationToken};
use gramlens_storage::connection::interrupt::InterruptGuard;
use gramlens_storage::sql::TableName;
use gramlens_storage::DatabaseManager;
use rusqlite::Connection;

/// Where a scan reads ngrams from and how long it may run.
///
/// The deadline is fixed when the context is created, so every statement of
/// one request shares the same budget. Each statement runs under an
/// [`InterruptGuard`]; an interrupted statement is reported as
/// [`AnalysisError::Cancelled`] when the token fired and
/// [`AnalysisError::Timeout`] otherwise.
#[derive(Clone)]
pub struct ScanContext<'a> {
    db: &'a DatabaseManager,
    table: TableName,
    token: CancellationToken,
    timeout: Duration,
    deadline: Instant,
}

impl<'a> ScanContext<'a> {
    pub fn new(db: &'a DatabaseManager, token: CancellationToken, timeout: Duration) -> Self {
        Self {
            db,
            table: TableName::ngrams(),
            token,
            timeout,
            deadline: Instant::now() + timeout,
        }
    }

    /// Read from `table` instead of the base `ngrams` table.
    pub fn with_table(mut self, table: TableName) -> Self {
        self.table = table;
        self
    }

    pub fn db(&self) -> &'a DatabaseManager {
        self.db
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fail fast when the request was abandoned or ran out of time.
    pub fn check(&self) -> Result<(), AnalysisError> {
        if self.token.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }
        if Instant::now() >= self.deadline {
            return Err(self.timeout_error());
        }
        Ok(())
    }

    /// Run one read statement on a pooled connection under an interrupt
    /// guard for the remaining budget.
    pub fn read<T, F>(&self, f: F) -> Result<T, AnalysisError>
    where
        F: FnOnce(&Connection, &TableName) -> Result<T, StorageError>,
    {
        self.check()?;
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        self.db
            .with_reader(|conn| {
                let _guard = InterruptGuard::install(conn, &self.token, remaining)?;
                f(conn, &self.table)
            })
            .map_err(|e| self.classify(e))
    }

    fn classify(&self, e: StorageError) -> AnalysisError {
        match e {
            StorageError::Interrupted if self.token.is_cancelled() => AnalysisError::Cancelled,
            StorageError::Interrupted => self.timeout_error(),
            other => AnalysisError::Storage(other),
        }
    }

    fn timeout_error(&self) -> AnalysisError {
        AnalysisError::Timeout {
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}
