//! Schema descriptors
//!
//! A [`Schema`] is the finished, immutable description of one entity's table:
//! its columns, which of them is the primary key, and how each column reads
//! its value out of a model. Descriptors are built once and shared as
//! `&'static` references through [`Model::schema`].

use crate::error::{RelataError, Result};
use crate::row::Row;
use crate::value::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Quotes an identifier for the store, doubling embedded quotes.
pub fn escape_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// A type stored as rows of one table
pub trait Model: Sized + Send + 'static {
    /// The descriptor of the table backing this model.
    fn schema() -> &'static Schema<Self>;

    /// Materializes a model from a row whose labels are the schema column names.
    fn from_row(row: &Row) -> Result<Self>;
}

//------------------------------------------------------------------------------
// ColumnDef
//------------------------------------------------------------------------------

/// Definition of one column of `M`'s table.
pub struct ColumnDef<M> {
    name: &'static str,
    table: &'static str,
    escaped_name: String,
    qualified_name: String,
    primary_key: bool,
    auto_id: bool,
    nullable: bool,
    serializer: fn(&M) -> Value,
}

impl<M> ColumnDef<M> {
    /// Declares a column read from a model by `serializer`.
    ///
    /// The table part of the qualified name is filled in by [`Schema::new`].
    pub fn new(name: &'static str, serializer: fn(&M) -> Value) -> Self {
        Self {
            name,
            table: "",
            escaped_name: escape_identifier(name),
            qualified_name: escape_identifier(name),
            primary_key: false,
            auto_id: false,
            nullable: false,
            serializer,
        }
    }

    /// Flags this column as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Flags this primary key as assigned by the store (`INTEGER PRIMARY KEY`).
    pub fn auto_id(mut self) -> Self {
        self.primary_key = true;
        self.auto_id = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// `"name"`
    #[inline]
    pub fn escaped_name(&self) -> &str {
        &self.escaped_name
    }

    /// `"table"."name"`
    #[inline]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    #[inline]
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    #[inline]
    pub fn is_auto_id(&self) -> bool {
        self.auto_id
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The storage-bindable value of this column for `model`.
    #[inline]
    pub fn get_serialized(&self, model: &M) -> Value {
        (self.serializer)(model)
    }
}

impl<M> fmt::Debug for ColumnDef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("primary_key", &self.primary_key)
            .field("auto_id", &self.auto_id)
            .field("nullable", &self.nullable)
            .finish()
    }
}

//------------------------------------------------------------------------------
// Schema
//------------------------------------------------------------------------------

/// Immutable table descriptor for `M`.
pub struct Schema<M> {
    table_name: &'static str,
    escaped_table_name: String,
    columns: Vec<ColumnDef<M>>,
    labels: Arc<[String]>,
    primary_key: usize,
    _model: PhantomData<fn() -> M>,
}

impl<M> Schema<M> {
    /// Validates and freezes a descriptor. Exactly one column must be the
    /// primary key and column names must be unique.
    pub fn new(table_name: &'static str, columns: Vec<ColumnDef<M>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(RelataError::Schema(format!(
                "table `{table_name}` has no columns"
            )));
        }

        let mut primary_key = None;
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].iter().any(|c| c.name == column.name) {
                return Err(RelataError::Schema(format!(
                    "duplicate column `{}` in table `{table_name}`",
                    column.name
                )));
            }
            if column.primary_key {
                if let Some(previous) = primary_key.replace(idx) {
                    let previous: &ColumnDef<M> = &columns[previous];
                    return Err(RelataError::Schema(format!(
                        "table `{table_name}` declares two primary keys: `{}` and `{}`",
                        previous.name, column.name
                    )));
                }
            }
        }
        let primary_key = primary_key.ok_or_else(|| {
            RelataError::Schema(format!("table `{table_name}` has no primary key"))
        })?;

        let escaped_table_name = escape_identifier(table_name);
        let columns: Vec<ColumnDef<M>> = columns
            .into_iter()
            .map(|mut column| {
                column.table = table_name;
                column.qualified_name = format!("{escaped_table_name}.{}", column.escaped_name);
                column
            })
            .collect();
        let labels = columns.iter().map(|c| c.name.to_string()).collect();

        Ok(Self {
            table_name,
            escaped_table_name,
            columns,
            labels,
            primary_key,
            _model: PhantomData,
        })
    }

    #[inline]
    pub fn table_name(&self) -> &'static str {
        self.table_name
    }

    #[inline]
    pub fn escaped_table_name(&self) -> &str {
        &self.escaped_table_name
    }

    #[inline]
    pub fn columns(&self) -> &[ColumnDef<M>] {
        &self.columns
    }

    /// Looks a column up by its logical name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef<M>> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`Schema::column`], failing with [`RelataError::Schema`] for an
    /// unknown name.
    pub fn require_column(&self, name: &str) -> Result<&ColumnDef<M>> {
        self.column(name).ok_or_else(|| {
            RelataError::Schema(format!(
                "table `{}` has no column `{name}`",
                self.table_name
            ))
        })
    }

    #[inline]
    pub fn primary_key(&self) -> &ColumnDef<M> {
        &self.columns[self.primary_key]
    }

    /// Logical column names in declaration order.
    #[inline]
    pub fn labels(&self) -> Arc<[String]> {
        self.labels.clone()
    }

    /// Comma-joined qualified names of every column, in declaration order.
    pub fn select_columns(&self) -> String {
        self.columns
            .iter()
            .map(ColumnDef::qualified_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<M> fmt::Debug for Schema<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("table_name", &self.table_name)
            .field("columns", &self.columns)
            .finish()
    }
}
