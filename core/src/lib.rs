pub mod condition;
pub mod connection;
pub mod deferred;
pub mod error;
pub mod event;
pub mod order;
pub mod row;
pub mod schema;
pub mod tracing;
pub mod value;

// Re-export key types and traits
pub use condition::{ColumnNaming, Condition, Conditional, Op};
pub use connection::{Connection, ConnectionExt};
#[cfg(feature = "tokio")]
pub use deferred::TokioBlocking;
pub use deferred::{Immediate, Maybe, NewThread, Pending, Scheduler, Single};
pub use error::{RelataError, Result};
pub use event::{ChangeEvent, ChangeKind, DataSetChangedEvent, EventHub, Observable};
pub use order::{Direction, OrderSpec, OrderSpecs};
pub use row::Row;
pub use schema::{ColumnDef, Model, Schema, escape_identifier};
pub use value::{FromValue, Value};
