//! # relata
//!
//! Position-aware relations over SQLite. A [`Relation`](sqlite::Relation) is an
//! ordered, filtered view of one table that can be read like a list: count it,
//! fetch the item at a position, find where an item sits, delete an item and
//! learn where it was, or cut the list down to a size.
//!
//! ## Quick Start
//!
//! ```rust
//! use relata::prelude::*;
//! use std::sync::OnceLock;
//!
//! struct Task {
//!     id: i64,
//!     title: String,
//!     rank: i64,
//! }
//!
//! impl Model for Task {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: OnceLock<Schema<Task>> = OnceLock::new();
//!         SCHEMA.get_or_init(|| {
//!             Schema::new(
//!                 "tasks",
//!                 vec![
//!                     ColumnDef::new("id", |t: &Task| t.id.into()).auto_id(),
//!                     ColumnDef::new("title", |t: &Task| t.title.as_str().into()),
//!                     ColumnDef::new("rank", |t: &Task| t.rank.into()),
//!                 ],
//!             )
//!             .expect("valid schema")
//!         })
//!     }
//!
//!     fn from_row(row: &Row) -> relata::Result<Self> {
//!         Ok(Task {
//!             id: row.get("id")?,
//!             title: row.get("title")?,
//!             rank: row.get("rank")?,
//!         })
//!     }
//! }
//!
//! # fn main() -> relata::Result<()> {
//! let db = Database::open_in_memory()?;
//! db.execute_batch(
//!     "CREATE TABLE tasks (id INTEGER PRIMARY KEY, title TEXT NOT NULL, rank INTEGER NOT NULL)",
//! )?;
//!
//! let rank = Task::schema().require_column("rank")?;
//! let tasks = db.relation::<Task>().order_by_asc(rank);
//! for (title, r) in [("write", 2), ("plan", 1), ("ship", 3)] {
//!     tasks.insert(|| Task { id: 0, title: title.into(), rank: r })?;
//! }
//!
//! let first = tasks.get(0)?;
//! assert_eq!(first.title, "plan");
//! assert_eq!(tasks.delete_item(&first)?, Some(0));
//! assert_eq!(tasks.truncate(1)?, 1);
//! assert_eq!(tasks.count()?, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! | Feature    | Enables                                              |
//! |------------|------------------------------------------------------|
//! | `rusqlite` | [`sqlite::rusqlite::Database`], the bundled driver   |
//! | `tokio`    | the `TokioBlocking` scheduler for deferred results   |
//! | `tracing`  | debug events per statement, info events per unit of work |

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;

// =============================================================================
// Root-level exports
// =============================================================================

/// Result type for relata operations
pub use relata_core::error::Result;

/// Error types
pub mod error {
    pub use relata_core::error::RelataError;
}

pub use config::DatabaseConfig;
pub use relata_core::error::RelataError;

// =============================================================================
// Core module - shared functionality
// =============================================================================

/// Types shared by every backend.
///
/// - **Schema**: `Model`, `Schema`, `ColumnDef`
/// - **Values**: `Value`, `FromValue`, `Row`
/// - **Filtering and ordering**: `Condition`, `Conditional`, `Op`, `OrderSpec`
/// - **Deferred results**: `Single`, `Maybe`, `Pending` and the schedulers
/// - **Change events**: `ChangeEvent`, `EventHub`, `Observable`
pub mod core {
    pub use relata_core::*;
}

// =============================================================================
// SQLite module
// =============================================================================

/// SQLite statement builders, relations and drivers.
pub mod sqlite {
    pub use relata_sqlite::*;

    #[cfg(feature = "rusqlite")]
    pub mod rusqlite;
}

// =============================================================================
// Prelude
// =============================================================================

/// Everything needed to declare models and work with relations.
///
/// ```rust
/// use relata::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::DatabaseConfig;
    pub use relata_core::{
        ColumnDef, Conditional, Connection, ConnectionExt, Direction, FromValue, Immediate,
        Maybe, Model, NewThread, Op, OrderSpec, Pending, Row, Scheduler, Schema, Single, Value,
    };
    #[cfg(feature = "tokio")]
    pub use relata_core::TokioBlocking;
    pub use relata_sqlite::{JournalMode, OnConflict, Relation, Selector, TransactionType};

    #[cfg(feature = "rusqlite")]
    pub use crate::sqlite::rusqlite::Database;
}
