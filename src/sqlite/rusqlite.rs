//! Synchronous SQLite driver using [`rusqlite`].
//!
//! # Example
//!
//! ```no_run
//! use relata::prelude::*;
//!
//! # struct Note { id: i64, body: String }
//! # impl Model for Note {
//! #     fn schema() -> &'static Schema<Self> { unimplemented!() }
//! #     fn from_row(row: &Row) -> relata::Result<Self> {
//! #         Ok(Note { id: row.get("id")?, body: row.get("body")? })
//! #     }
//! # }
//! fn main() -> relata::Result<()> {
//!     let db = Database::open(&DatabaseConfig::file("notes.db"))?;
//!     let notes = db.relation::<Note>();
//!
//!     let id = notes.insert(|| Note { id: 0, body: "hello".into() })?;
//!     let first = notes.get(0)?;
//!     assert_eq!(first.id, id);
//!     Ok(())
//! }
//! ```

use crate::config::DatabaseConfig;
use ::rusqlite::params_from_iter;
use parking_lot::ReentrantMutex;
use relata_core::{
    ChangeEvent, Connection, EventHub, Model, Result, Row, Value, relata_trace_query,
    relata_trace_tx,
};
use relata_sqlite::{Pragma, Relation, TransactionType};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// Connection state only touched while the lock is held.
struct Session {
    conn: ::rusqlite::Connection,
    depth: Cell<u32>,
    pending: RefCell<Vec<ChangeEvent>>,
}

struct Shared {
    session: ReentrantMutex<Session>,
    hub: EventHub,
    tx_type: TransactionType,
}

/// Shared handle to one SQLite connection.
///
/// Clones share the connection. Statements from different threads are
/// serialized, and a unit of work holds the connection for its whole
/// duration, so the reads and writes inside it observe one snapshot.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Shared>,
}

impl Database {
    /// Opens the database described by `config` and applies its pragmas.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let conn = match &config.path {
            Some(path) => ::rusqlite::Connection::open(path)?,
            None => ::rusqlite::Connection::open_in_memory()?,
        };
        for pragma in config.pragmas() {
            apply_pragma(&conn, pragma)?;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(path = ?config.path, tx_type = %config.transaction, "relata.open");
        Ok(Self::new(conn, config.transaction))
    }

    /// A private in-memory database with default settings.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&DatabaseConfig::in_memory())
    }

    /// Wraps an already opened connection.
    pub fn new(conn: ::rusqlite::Connection, tx_type: TransactionType) -> Self {
        Self {
            inner: Arc::new(Shared {
                session: ReentrantMutex::new(Session {
                    conn,
                    depth: Cell::new(0),
                    pending: RefCell::new(Vec::new()),
                }),
                hub: EventHub::new(),
                tx_type,
            }),
        }
    }

    #[inline]
    pub fn tx_type(&self) -> TransactionType {
        self.inner.tx_type
    }

    /// Whether a unit of work is open on this connection.
    pub fn in_transaction(&self) -> bool {
        self.inner.session.lock().depth.get() > 0
    }

    /// Runs one or more `;`-separated statements without arguments, typically DDL.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        relata_trace_query!(sql, 0);
        self.inner.session.lock().conn.execute_batch(sql)?;
        Ok(())
    }

    /// This handle as a shareable connection boundary.
    pub fn shared(&self) -> Arc<dyn Connection> {
        Arc::new(self.clone())
    }

    /// A relation over `M`'s table with no filters and no ordering.
    pub fn relation<M: Model>(&self) -> Relation<M> {
        Relation::new(self.shared())
    }
}

fn finish(session: &Session, outcome: Result<()>) -> Result<()> {
    match outcome {
        Ok(()) => {
            relata_trace_tx!("commit", "sqlite.rusqlite");
            if let Err(e) = session.conn.execute_batch("COMMIT") {
                rollback(session);
                return Err(e.into());
            }
            Ok(())
        }
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %e, "relata: unit of work failed, rolling back");
            rollback(session);
            Err(e)
        }
    }
}

fn rollback(session: &Session) {
    relata_trace_tx!("rollback", "sqlite.rusqlite");
    session.pending.borrow_mut().clear();
    // SQLite may already have rolled back on its own, e.g. ON CONFLICT ROLLBACK.
    if !session.conn.is_autocommit() {
        if let Err(_e) = session.conn.execute_batch("ROLLBACK") {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "relata: rollback failed");
        }
    }
}

fn apply_pragma(conn: &::rusqlite::Connection, pragma: Pragma) -> Result<()> {
    let sql = pragma.to_string();
    relata_trace_query!(&sql, 0);
    if pragma.returns_row() {
        conn.query_row(&sql, [], |_| Ok(()))?;
    } else {
        conn.execute_batch(&sql)?;
    }
    Ok(())
}

impl Connection for Database {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<usize> {
        relata_trace_query!(sql, args.len());
        let session = self.inner.session.lock();
        let mut stmt = session.conn.prepare_cached(sql)?;
        Ok(stmt.execute(params_from_iter(args))?)
    }

    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        relata_trace_query!(sql, args.len());
        let session = self.inner.session.lock();
        let mut stmt = session.conn.prepare_cached(sql)?;
        let labels: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = labels.len();

        let mut rows = stmt.query(params_from_iter(args))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..width)
                .map(|idx| row.get_ref(idx).map(Value::from))
                .collect::<::rusqlite::Result<Vec<_>>>()?;
            out.push(Row::new(labels.clone(), values));
        }
        Ok(out)
    }

    fn insert(&self, sql: &str, args: &[Value]) -> Result<Option<i64>> {
        relata_trace_query!(sql, args.len());
        let session = self.inner.session.lock();
        let mut stmt = session.conn.prepare_cached(sql)?;
        // last_insert_rowid still holds the previous insert when nothing was written.
        let inserted = stmt.execute(params_from_iter(args))?;
        Ok((inserted > 0).then(|| session.conn.last_insert_rowid()))
    }

    fn transaction_sync(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        let session = self.inner.session.lock();
        if session.depth.get() > 0 {
            session.depth.set(session.depth.get() + 1);
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| work()));
            session.depth.set(session.depth.get() - 1);
            return outcome.unwrap_or_else(|payload| std::panic::resume_unwind(payload));
        }

        relata_trace_tx!("begin", "sqlite.rusqlite");
        session.conn.execute_batch(self.inner.tx_type.begin_sql())?;
        session.depth.set(1);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| work()));
        session.depth.set(0);

        match outcome {
            Ok(outcome) => {
                finish(&session, outcome)?;
                let events = session.pending.take();
                drop(session);
                for event in &events {
                    self.inner.hub.publish(event);
                }
                Ok(())
            }
            Err(payload) => {
                rollback(&session);
                drop(session);
                std::panic::resume_unwind(payload);
            }
        }
    }

    fn notify(&self, event: ChangeEvent) {
        let session = self.inner.session.lock();
        if session.depth.get() > 0 {
            session.pending.borrow_mut().push(event);
            return;
        }
        drop(session);
        self.inner.hub.publish(&event);
    }

    fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.inner.hub.subscribe()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("tx_type", &self.inner.tx_type)
            .field("hub", &self.inner.hub)
            .finish_non_exhaustive()
    }
}
