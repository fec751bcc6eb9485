use super::OnConflict;
use crate::builder::select::Selector;
use relata_core::{
    ChangeEvent, ChangeKind, ColumnDef, Connection, ConnectionExt, Maybe, Model, RelataError,
    Result, Single, Value,
};
use std::fmt;
use std::sync::Arc;

//------------------------------------------------------------------------------
// Inserter Definition
//------------------------------------------------------------------------------

/// A prepared `INSERT` for `M`, reusable for any number of models.
pub struct Inserter<M: 'static> {
    conn: Arc<dyn Connection>,
    columns: Vec<&'static ColumnDef<M>>,
    sql: String,
}

impl<M: Model> Inserter<M> {
    /// `without_auto_id` leaves a store-assigned primary key out of the
    /// column list so the store picks the key.
    pub fn new(conn: Arc<dyn Connection>, on_conflict: OnConflict, without_auto_id: bool) -> Self {
        let schema = M::schema();
        let columns: Vec<&'static ColumnDef<M>> = schema
            .columns()
            .iter()
            .filter(|column| !(without_auto_id && column.is_auto_id()))
            .collect();

        let mut sql = format!("{on_conflict} INTO {}", schema.escaped_table_name());
        if columns.is_empty() {
            sql.push_str(" DEFAULT VALUES");
        } else {
            let names = columns
                .iter()
                .map(|column| column.escaped_name())
                .collect::<Vec<_>>()
                .join(", ");
            let placeholders = vec!["?"; columns.len()].join(", ");
            sql.push_str(&format!(" ({names}) VALUES ({placeholders})"));
        }

        Self { conn, columns, sql }
    }

    #[inline]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Values bound for `model`, in column-list order.
    pub fn bind_args(&self, model: &M) -> Vec<Value> {
        self.columns
            .iter()
            .map(|column| column.get_serialized(model))
            .collect()
    }

    /// Inserts `model` and returns its row id. `None` means the conflict
    /// policy skipped the row, in which case no change is reported.
    pub fn execute(&self, model: &M) -> Result<Option<i64>> {
        let rowid = self.conn.insert(&self.sql, &self.bind_args(model))?;
        if rowid.is_some() {
            self.conn
                .notify(ChangeEvent::new(M::schema().table_name(), ChangeKind::Insert));
        }
        Ok(rowid)
    }

    /// Inserts the model built by `factory`.
    pub fn execute_with(&self, factory: impl FnOnce() -> M) -> Result<Option<i64>> {
        self.execute(&factory())
    }

    /// Inserts every model as one unit of work.
    pub fn execute_all(&self, models: impl IntoIterator<Item = M>) -> Result<Vec<Option<i64>>> {
        self.conn.transaction(|| {
            models
                .into_iter()
                .map(|model| self.execute(&model))
                .collect()
        })
    }

    /// Defers the insert of `model`.
    pub fn execute_as_single(self, model: M) -> Maybe<i64> {
        Single::new(move || self.execute(&model))
    }
}

impl<M: 'static> fmt::Debug for Inserter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inserter")
            .field("sql", &self.sql)
            .finish_non_exhaustive()
    }
}

/// Row id of an insert whose conflict policy always writes a row.
pub(crate) fn require_row(rowid: Option<i64>) -> Result<i64> {
    rowid.ok_or_else(|| RelataError::ExecutionError("insert did not create a row".into()))
}

/// Persists the model produced by `factory` and returns it as stored, with
/// store-assigned values filled in.
pub fn create_model<M: Model>(
    conn: &Arc<dyn Connection>,
    factory: impl FnOnce() -> M,
) -> Result<M> {
    conn.transaction(|| {
        let rowid = Inserter::new(conn.clone(), OnConflict::None, true)
            .execute_with(factory)
            .and_then(require_row)?;
        Selector::<M>::new(conn.clone()).where_rowid(rowid).value()
    })
}
