use crate::error::{RelataError, Result};
use crate::value::{FromValue, Value};
use std::sync::Arc;

/// One result row: column labels shared across the result set, and the cell values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub labels: Arc<[String]>,
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(labels: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { labels, values }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw cell at `index`.
    pub fn value(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or_else(|| {
            RelataError::Mapping(format!(
                "column index {index} out of range ({} columns)",
                self.values.len()
            ))
        })
    }

    /// Cell at `index` converted into `T`.
    pub fn get_index<T: FromValue>(&self, index: usize) -> Result<T> {
        T::from_value(self.value(index)?)
    }

    /// Cell labelled `name` converted into `T`.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        let index = self
            .labels
            .iter()
            .position(|label| label == name)
            .ok_or_else(|| RelataError::Mapping(format!("no column named `{name}` in row")))?;
        T::from_value(&self.values[index]).map_err(|e| match e {
            RelataError::Mapping(msg) => RelataError::Mapping(format!("column `{name}`: {msg}")),
            other => other,
        })
    }

    /// Replaces the labels, keeping values. Used when the selected columns are
    /// known to be exactly `labels`, in order.
    pub fn with_labels(self, labels: Arc<[String]>) -> Self {
        Self {
            labels,
            values: self.values,
        }
    }
}
