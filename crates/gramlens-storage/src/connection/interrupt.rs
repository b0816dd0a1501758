//! Cancellation and timeouts for long-running statements.
//!
//! SQLite calls the progress handler every `INTERRUPT_CHECK_INTERVAL`
//! virtual-machine steps; returning `true` aborts the running statement with
//! `SQLITE_INTERRUPT`, which surfaces as `StorageError::Interrupted`.

use std::time::{Duration, Instant};

use gramlens_core::constants::INTERRUPT_CHECK_INTERVAL;
use gramlens_core::errors::StorageError;
use gramlens_core::traits::{Cancellable, CancellationToken};
use rusqlite::Connection;

/// Installs a progress handler for its lifetime and removes it on drop.
pub struct InterruptGuard<'c> {
    conn: &'c Connection,
}

impl<'c> InterruptGuard<'c> {
    /// Fails immediately when the token is already cancelled.
    pub fn install(
        conn: &'c Connection,
        token: &CancellationToken,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        if token.is_cancelled() {
            return Err(StorageError::Interrupted);
        }
        let token = token.clone();
        let deadline = Instant::now() + timeout;
        conn.progress_handler(
            INTERRUPT_CHECK_INTERVAL,
            Some(move || token.is_cancelled() || Instant::now() >= deadline),
        );
        Ok(Self { conn })
    }
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }
}

/// Run `f` on `conn` under an interrupt guard.
pub fn with_interrupt<F, T, E>(
    conn: &Connection,
    token: &CancellationToken,
    timeout: Duration,
    f: F,
) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<StorageError>,
{
    let _guard = InterruptGuard::install(conn, token, timeout)?;
    f(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_storage_err;

    const SLOW_QUERY: &str = "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c)
                              SELECT count(*) FROM c";

    fn run_slow(conn: &Connection) -> Result<i64, StorageError> {
        conn.query_row(SLOW_QUERY, [], |row| row.get(0))
            .map_err(to_storage_err)
    }

    #[test]
    fn timeout_interrupts_running_statement() {
        let conn = Connection::open_in_memory().unwrap();
        let token = CancellationToken::new();
        let result = with_interrupt(&conn, &token, Duration::from_millis(20), run_slow);
        assert!(matches!(result, Err(StorageError::Interrupted)));

        let n: i64 = conn.query_row("SELECT 41 + 1", [], |row| row.get(0)).unwrap();
        assert_eq!(n, 42);
    }

    #[test]
    fn cancelled_token_refuses_to_start() {
        let conn = Connection::open_in_memory().unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let result: Result<i64, StorageError> =
            with_interrupt(&conn, &token, Duration::from_secs(5), |_| Ok(1));
        assert!(matches!(result, Err(StorageError::Interrupted)));
    }

    #[test]
    fn cancellation_from_another_thread_stops_the_scan() {
        let conn = Connection::open_in_memory().unwrap();
        let token = CancellationToken::new();
        let canceller = token.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            canceller.cancel();
        });
        let result = with_interrupt(&conn, &token, Duration::from_secs(60), run_slow);
        handle.join().unwrap();
        assert!(matches!(result, Err(StorageError::Interrupted)));
    }
}
