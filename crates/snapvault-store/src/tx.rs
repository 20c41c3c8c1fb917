//! Transaction coordinator
//!
//! Every store operation is one unit of work inside one transaction. Write
//! units begin `IMMEDIATE`, taking the writer lock up front so a
//! read-then-write sequence can never interleave with another writer. Read
//! units begin deferred; under WAL each sees one stable snapshot of the
//! database for its whole duration.
//!
//! Any error rolls the whole unit back. Each unit emits one start event and
//! exactly one end or end_error event.

use crate::db::Database;
use crate::dialect::Dialect;
use crate::errors::{from_rusqlite, Result};
use rusqlite::{Transaction, TransactionBehavior};
use snapvault_core::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

impl Database {
    /// Run side-effect-free work in a deferred transaction
    pub fn read<T, F>(&mut self, op: &'static str, work: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>, &dyn Dialect) -> Result<T>,
    {
        self.run_unit(op, TransactionBehavior::Deferred, work)
    }

    /// Run mutating work in an immediate transaction
    pub fn write<T, F>(&mut self, op: &'static str, work: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>, &dyn Dialect) -> Result<T>,
    {
        self.run_unit(op, TransactionBehavior::Immediate, work)
    }

    fn run_unit<T, F>(&mut self, op: &'static str, behavior: TransactionBehavior, work: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>, &dyn Dialect) -> Result<T>,
    {
        log_op_start!(op);
        let start = Instant::now();

        let dialect = self.dialect.as_ref();
        let result = self
            .conn
            .transaction_with_behavior(behavior)
            .map_err(from_rusqlite)
            .and_then(|tx| {
                let value = work(&tx, dialect)?;
                tx.commit().map_err(from_rusqlite)?;
                Ok(value)
            });

        match result {
            Ok(value) => {
                log_op_end!(op, duration_ms = start.elapsed().as_millis() as u64);
                Ok(value)
            }
            Err(e) => {
                let e = if e.op().is_none() { e.with_op(op) } else { e };
                log_op_error!(op, &e, duration_ms = start.elapsed().as_millis() as u64);
                Err(e)
            }
        }
    }
}
