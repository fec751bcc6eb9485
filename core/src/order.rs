use crate::schema::ColumnDef;
use std::fmt;

/// Sort direction of one ordering term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One `(column, direction)` ordering term.
pub struct OrderSpec<M: 'static> {
    column: &'static ColumnDef<M>,
    direction: Direction,
}

impl<M: 'static> OrderSpec<M> {
    pub const fn new(column: &'static ColumnDef<M>, direction: Direction) -> Self {
        Self { column, direction }
    }

    pub const fn asc(column: &'static ColumnDef<M>) -> Self {
        Self::new(column, Direction::Asc)
    }

    pub const fn desc(column: &'static ColumnDef<M>) -> Self {
        Self::new(column, Direction::Desc)
    }

    #[inline]
    pub fn column(&self) -> &'static ColumnDef<M> {
        self.column
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl<M: 'static> Clone for OrderSpec<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: 'static> Copy for OrderSpec<M> {}

impl<M: 'static> fmt::Debug for OrderSpec<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OrderSpec")
            .field(&self.column.name())
            .field(&self.direction)
            .finish()
    }
}

impl<M: 'static> fmt::Display for OrderSpec<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column.qualified_name(), self.direction)
    }
}

//------------------------------------------------------------------------------
// OrderSpecs
//------------------------------------------------------------------------------

/// Ordering terms in precedence order. Earlier terms are the primary keys of
/// the sort, later ones only break ties.
pub struct OrderSpecs<M: 'static> {
    specs: Vec<OrderSpec<M>>,
}

impl<M: 'static> Default for OrderSpecs<M> {
    fn default() -> Self {
        Self { specs: Vec::new() }
    }
}

impl<M: 'static> Clone for OrderSpecs<M> {
    fn clone(&self) -> Self {
        Self {
            specs: self.specs.clone(),
        }
    }
}

impl<M: 'static> fmt::Debug for OrderSpecs<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.specs).finish()
    }
}

impl<M: 'static> OrderSpecs<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tie-break level. Existing terms are never replaced.
    pub fn push(&mut self, spec: OrderSpec<M>) {
        self.specs.push(spec);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrderSpec<M>> {
        self.specs.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The terms for an `ORDER BY` clause, or `None` when there is nothing to
    /// order by. Callers omit the keyword entirely in that case.
    pub fn build_ordering_terms(&self) -> Option<String> {
        if self.specs.is_empty() {
            return None;
        }
        Some(
            self.specs
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

impl<'a, M: 'static> IntoIterator for &'a OrderSpecs<M> {
    type Item = &'a OrderSpec<M>;
    type IntoIter = std::slice::Iter<'a, OrderSpec<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<M: 'static> FromIterator<OrderSpec<M>> for OrderSpecs<M> {
    fn from_iter<I: IntoIterator<Item = OrderSpec<M>>>(iter: I) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}
