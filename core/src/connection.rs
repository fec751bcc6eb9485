//! Connection boundary
//!
//! Everything a statement builder needs from a store: statement execution,
//! atomic units of work and change notification. Drivers implement
//! [`Connection`]; builders only ever see `dyn Connection`.

use crate::error::{RelataError, Result};
use crate::event::ChangeEvent;
use crate::row::Row;
use crate::value::Value;
use std::sync::mpsc::Receiver;

pub trait Connection: Send + Sync {
    /// Runs a statement and returns the number of rows it changed.
    fn execute(&self, sql: &str, args: &[Value]) -> Result<usize>;

    /// Runs a query and collects every result row.
    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>>;

    /// Runs an `INSERT` and returns the row id of the inserted row, or
    /// `None` when the statement inserted nothing (`INSERT OR IGNORE` on a
    /// conflict).
    fn insert(&self, sql: &str, args: &[Value]) -> Result<Option<i64>>;

    /// Runs `work` atomically.
    ///
    /// A call made while another unit of work is active on the same
    /// connection joins it instead of opening a second transaction. The
    /// outermost call commits when `work` succeeds and rolls back otherwise.
    fn transaction_sync(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()>;

    /// Records a change. Inside a unit of work the event is held back until
    /// commit and discarded on rollback.
    fn notify(&self, event: ChangeEvent);

    /// Subscribes to committed change events.
    fn subscribe(&self) -> Receiver<ChangeEvent>;
}

/// Conveniences layered over any [`Connection`].
pub trait ConnectionExt: Connection {
    /// Runs `work` as one unit of work and hands back its result.
    fn transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut work = Some(work);
        let mut output = None;
        self.transaction_sync(&mut || {
            if let Some(work) = work.take() {
                output = Some(work()?);
            }
            Ok(())
        })?;
        output.ok_or_else(|| RelataError::TransactionError("unit of work did not run".into()))
    }

    /// Runs a single-column integer query such as `SELECT COUNT(*)`.
    fn query_count(&self, sql: &str, args: &[Value]) -> Result<usize> {
        let rows = self.query(sql, args)?;
        let row = rows
            .first()
            .ok_or_else(|| RelataError::Mapping("count query returned no rows".into()))?;
        row.get_index::<usize>(0)
    }
}

impl<C: Connection + ?Sized> ConnectionExt for C {}
