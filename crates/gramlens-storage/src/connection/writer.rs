//! Write connection utilities: BEGIN IMMEDIATE transactions.

use gramlens_core::errors::StorageError;
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::to_storage_err;

/// Run `f` inside a BEGIN IMMEDIATE transaction.
///
/// The write lock is taken at BEGIN, so two batches never interleave. The
/// transaction commits only when `f` returns `Ok`; any error rolls it back.
pub fn with_immediate_transaction<F, T, E>(conn: &mut Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<StorageError>,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(to_storage_err)?;

    let result = f(&tx)?;

    tx.commit().map_err(to_storage_err)?;
    Ok(result)
}
