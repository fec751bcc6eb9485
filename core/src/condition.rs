//! WHERE clause accumulation
//!
//! A [`Condition`] renders each predicate into clause text as it is added and
//! records the bound arguments in placeholder order, so the generated text and
//! [`Condition::bind_args`] always line up one-to-one.

use crate::error::{RelataError, Result};
use crate::schema::{ColumnDef, Model};
use crate::value::Value;
use std::fmt;
use std::marker::PhantomData;

/// How column references are spelled inside generated clause text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnNaming {
    /// `"name"`
    #[default]
    Escaped,
    /// `"table"."name"`, unambiguous inside joins and subqueries
    Qualified,
}

/// Comparison operator of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    Glob,
}

impl Op {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::NotEq => "<>",
            Op::Lt => "<",
            Op::LtEq => "<=",
            Op::Gt => ">",
            Op::GtEq => ">=",
            Op::Like => "LIKE",
            Op::Glob => "GLOB",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connector {
    And,
    Or,
}

/// Counts `?` placeholders outside of single-quoted literals.
pub fn count_placeholders(clause: &str) -> usize {
    let mut in_literal = false;
    clause
        .chars()
        .filter(|&c| {
            if c == '\'' {
                in_literal = !in_literal;
            }
            c == '?' && !in_literal
        })
        .count()
}

//------------------------------------------------------------------------------
// Condition
//------------------------------------------------------------------------------

/// Predicate terms and their bound arguments.
pub struct Condition<M> {
    naming: ColumnNaming,
    terms: Vec<(Connector, String)>,
    args: Vec<Value>,
    next: Connector,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Condition<M> {
    fn clone(&self) -> Self {
        Self {
            naming: self.naming,
            terms: self.terms.clone(),
            args: self.args.clone(),
            next: self.next,
            _model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for Condition<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("clause", &self.build_where_clause())
            .field("args", &self.args)
            .finish()
    }
}

impl<M> Default for Condition<M> {
    fn default() -> Self {
        Self::new(ColumnNaming::default())
    }
}

impl<M> Condition<M> {
    pub fn new(naming: ColumnNaming) -> Self {
        Self {
            naming,
            terms: Vec::new(),
            args: Vec::new(),
            next: Connector::And,
            _model: PhantomData,
        }
    }

    #[inline]
    pub fn naming(&self) -> ColumnNaming {
        self.naming
    }

    /// The spelling of `column` inside clause text.
    pub fn build_column_name<'c>(&self, column: &'c ColumnDef<M>) -> &'c str {
        match self.naming {
            ColumnNaming::Escaped => column.escaped_name(),
            ColumnNaming::Qualified => column.qualified_name(),
        }
    }

    fn push_term(&mut self, clause: String, args: impl IntoIterator<Item = Value>) {
        self.terms.push((self.next, clause));
        self.args.extend(args);
        self.next = Connector::And;
    }

    /// Appends `column <op> ?` bound to `value`.
    pub fn push(&mut self, column: &ColumnDef<M>, op: Op, value: Value) {
        let clause = format!("{} {op} ?", self.build_column_name(column));
        self.push_term(clause, [value]);
    }

    /// Appends a hand-written clause. The number of `?` placeholders must
    /// match the number of arguments.
    pub fn push_raw(&mut self, clause: &str, args: Vec<Value>) -> Result<()> {
        let placeholders = count_placeholders(clause);
        if placeholders != args.len() {
            return Err(RelataError::InvalidArgument(format!(
                "clause `{clause}` has {placeholders} placeholders but {} arguments were given",
                args.len()
            )));
        }
        self.push_term(clause.to_string(), args);
        Ok(())
    }

    /// Appends `_rowid_ = ?`.
    pub fn push_rowid(&mut self, rowid: i64)
    where
        M: Model,
    {
        let clause = match self.naming {
            ColumnNaming::Escaped => "_rowid_ = ?".to_string(),
            ColumnNaming::Qualified => format!("{}._rowid_ = ?", M::schema().escaped_table_name()),
        };
        self.push_term(clause, [Value::Integer(rowid)]);
    }

    /// Appends `column [NOT] IN (?, ...)`.
    pub fn push_in(&mut self, column: &ColumnDef<M>, negated: bool, values: Vec<Value>) {
        let placeholders = vec!["?"; values.len()].join(", ");
        let keyword = if negated { "NOT IN" } else { "IN" };
        let clause = format!(
            "{} {keyword} ({placeholders})",
            self.build_column_name(column)
        );
        self.push_term(clause, values);
    }

    /// Appends `column IS [NOT] NULL`.
    pub fn push_null(&mut self, column: &ColumnDef<M>, negated: bool) {
        let keyword = if negated { "IS NOT NULL" } else { "IS NULL" };
        let clause = format!("{} {keyword}", self.build_column_name(column));
        self.push_term(clause, []);
    }

    /// Joins the next term with `AND` (the default).
    pub fn and(&mut self) {
        self.next = Connector::And;
    }

    /// Joins the next term with `OR`.
    pub fn or(&mut self) {
        self.next = Connector::Or;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Clause text without the `WHERE` keyword, or `None` when there are no terms.
    ///
    /// Terms combine left to right: `a OR b AND c` renders as
    /// `((a) OR (b)) AND (c)`, so a term appended with `AND` always narrows
    /// everything before it.
    pub fn build_where_clause(&self) -> Option<String> {
        let mut terms = self.terms.iter();
        let (_, first) = terms.next()?;
        let mut sql = format!("({first})");
        let mut open_or = false;
        for (connector, clause) in terms {
            match connector {
                Connector::Or => {
                    sql.push_str(" OR ");
                    open_or = true;
                }
                Connector::And => {
                    if open_or {
                        sql = format!("({sql})");
                        open_or = false;
                    }
                    sql.push_str(" AND ");
                }
            }
            sql.push('(');
            sql.push_str(clause);
            sql.push(')');
        }
        Some(sql)
    }

    /// Arguments in placeholder order.
    #[inline]
    pub fn bind_args(&self) -> &[Value] {
        &self.args
    }

    /// Number of `?` placeholders in the rendered clause.
    pub fn placeholder_count(&self) -> usize {
        self.terms
            .iter()
            .map(|(_, clause)| count_placeholders(clause))
            .sum()
    }
}

//------------------------------------------------------------------------------
// Conditional
//------------------------------------------------------------------------------

/// Fluent predicate methods shared by every condition-carrying builder.
pub trait Conditional<M: Model>: Sized {
    fn condition(&self) -> &Condition<M>;

    fn condition_mut(&mut self) -> &mut Condition<M>;

    /// Adds `column <op> value`.
    fn r#where(mut self, column: &ColumnDef<M>, op: Op, value: impl Into<Value>) -> Self {
        self.condition_mut().push(column, op, value.into());
        self
    }

    /// Adds a hand-written clause with `?` placeholders.
    fn where_raw<I>(mut self, clause: &str, args: I) -> crate::error::Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let args = args.into_iter().map(Into::into).collect();
        self.condition_mut().push_raw(clause, args)?;
        Ok(self)
    }

    fn where_in<I>(mut self, column: &ColumnDef<M>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.condition_mut().push_in(column, false, values);
        self
    }

    fn where_not_in<I>(mut self, column: &ColumnDef<M>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.condition_mut().push_in(column, true, values);
        self
    }

    fn where_null(mut self, column: &ColumnDef<M>) -> Self {
        self.condition_mut().push_null(column, false);
        self
    }

    fn where_not_null(mut self, column: &ColumnDef<M>) -> Self {
        self.condition_mut().push_null(column, true);
        self
    }

    fn and(mut self) -> Self {
        self.condition_mut().and();
        self
    }

    fn or(mut self) -> Self {
        self.condition_mut().or();
        self
    }

    fn bind_args(&self) -> &[Value] {
        self.condition().bind_args()
    }
}
