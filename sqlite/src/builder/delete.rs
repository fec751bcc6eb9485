use crate::helpers;
use relata_core::{
    ChangeEvent, ChangeKind, ColumnNaming, Condition, Conditional, Connection, Model, Result,
};
use std::fmt;
use std::sync::Arc;

/// `DELETE` of the rows matching a condition.
pub struct Deleter<M> {
    conn: Arc<dyn Connection>,
    condition: Condition<M>,
}

impl<M> Clone for Deleter<M> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl<M> fmt::Debug for Deleter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deleter")
            .field("condition", &self.condition)
            .finish_non_exhaustive()
    }
}

impl<M: Model> Conditional<M> for Deleter<M> {
    fn condition(&self) -> &Condition<M> {
        &self.condition
    }

    fn condition_mut(&mut self) -> &mut Condition<M> {
        &mut self.condition
    }
}

impl<M: Model> Deleter<M> {
    pub fn new(conn: Arc<dyn Connection>) -> Self {
        Self::from_condition(conn, Condition::new(ColumnNaming::Qualified))
    }

    pub(crate) fn from_condition(conn: Arc<dyn Connection>, condition: Condition<M>) -> Self {
        Self { conn, condition }
    }

    pub fn sql(&self) -> String {
        let mut sql = format!("DELETE FROM {}", M::schema().escaped_table_name());
        helpers::r#where(&mut sql, &self.condition);
        sql
    }

    /// Runs the delete and returns the number of removed rows.
    pub fn execute(&self) -> Result<usize> {
        let sql = self.sql();
        let deleted = self.conn.execute(&sql, self.condition.bind_args())?;
        if deleted > 0 {
            self.conn
                .notify(ChangeEvent::new(M::schema().table_name(), ChangeKind::Delete));
        }
        Ok(deleted)
    }
}
