use crate::helpers;
use relata_core::{
    ChangeEvent, ChangeKind, ColumnDef, ColumnNaming, Condition, Conditional, Connection, Model,
    RelataError, Result, Value,
};
use std::fmt;
use std::sync::Arc;

//------------------------------------------------------------------------------
// Updater Definition
//------------------------------------------------------------------------------

/// `UPDATE` of the rows matching a condition.
pub struct Updater<M> {
    conn: Arc<dyn Connection>,
    condition: Condition<M>,
    assignments: Vec<(String, Value)>,
}

impl<M> Clone for Updater<M> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            condition: self.condition.clone(),
            assignments: self.assignments.clone(),
        }
    }
}

impl<M> fmt::Debug for Updater<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater")
            .field("condition", &self.condition)
            .field("assignments", &self.assignments)
            .finish_non_exhaustive()
    }
}

impl<M: Model> Conditional<M> for Updater<M> {
    fn condition(&self) -> &Condition<M> {
        &self.condition
    }

    fn condition_mut(&mut self) -> &mut Condition<M> {
        &mut self.condition
    }
}

impl<M: Model> Updater<M> {
    pub fn new(conn: Arc<dyn Connection>) -> Self {
        Self::from_condition(conn, Condition::new(ColumnNaming::Qualified))
    }

    pub(crate) fn from_condition(conn: Arc<dyn Connection>, condition: Condition<M>) -> Self {
        Self {
            conn,
            condition,
            assignments: Vec::new(),
        }
    }

    /// Assigns `value` to `column`. A later assignment to the same column wins.
    pub fn set(mut self, column: &ColumnDef<M>, value: impl Into<Value>) -> Self {
        let name = column.escaped_name();
        let value = value.into();
        match self.assignments.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.assignments.push((name.to_string(), value)),
        }
        self
    }

    /// Assigns the serialized value `model` holds for `column`.
    pub fn set_serialized(self, column: &ColumnDef<M>, model: &M) -> Self {
        let value = column.get_serialized(model);
        self.set(column, value)
    }

    pub fn sql(&self) -> String {
        let assignments = self
            .assignments
            .iter()
            .map(|(name, _)| format!("{name} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!(
            "UPDATE {} SET {assignments}",
            M::schema().escaped_table_name()
        );
        helpers::r#where(&mut sql, &self.condition);
        sql
    }

    /// Assigned values followed by the condition's arguments.
    pub fn bind_args(&self) -> Vec<Value> {
        self.assignments
            .iter()
            .map(|(_, value)| value.clone())
            .chain(self.condition.bind_args().iter().cloned())
            .collect()
    }

    /// Runs the update and returns the number of changed rows.
    pub fn execute(&self) -> Result<usize> {
        if self.assignments.is_empty() {
            return Err(RelataError::InvalidArgument(
                "update has no assignments".into(),
            ));
        }
        let sql = self.sql();
        let changed = self.conn.execute(&sql, &self.bind_args())?;
        if changed > 0 {
            self.conn
                .notify(ChangeEvent::new(M::schema().table_name(), ChangeKind::Update));
        }
        Ok(changed)
    }
}
