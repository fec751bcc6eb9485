//! Statement builders for SQLite
//!
//! Each builder is a frozen statement bound to one kind of operation:
//! [`Selector`] reads, [`Inserter`] inserts, [`Updater`] updates and
//! [`Deleter`] deletes. Builders derived from a relation take a copy of its
//! condition and ordering at the moment they are created.

use std::fmt;

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

pub use delete::Deleter;
pub use insert::{Inserter, create_model};
pub use select::{DEFAULT_BATCH_SIZE, Iter, Selector};
pub use update::Updater;

/// Conflict resolution algorithm of an `INSERT`
///
/// See: <https://sqlite.org/lang_conflict.html>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnConflict {
    /// Plain `INSERT`, which behaves as `ABORT`
    #[default]
    None,
    Abort,
    Ignore,
    Replace,
    Fail,
    Rollback,
}

impl OnConflict {
    /// The `OR <algorithm>` keyword, if any.
    pub const fn as_sql(self) -> Option<&'static str> {
        match self {
            OnConflict::None => None,
            OnConflict::Abort => Some("ABORT"),
            OnConflict::Ignore => Some("IGNORE"),
            OnConflict::Replace => Some("REPLACE"),
            OnConflict::Fail => Some("FAIL"),
            OnConflict::Rollback => Some("ROLLBACK"),
        }
    }
}

/// Renders the statement head: `INSERT` or `INSERT OR <algorithm>`.
impl fmt::Display for OnConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_sql() {
            Some(algorithm) => write!(f, "INSERT OR {algorithm}"),
            None => f.write_str("INSERT"),
        }
    }
}
