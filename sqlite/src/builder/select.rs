use crate::helpers;
use relata_core::{
    ColumnDef, ColumnNaming, Condition, Conditional, Connection, ConnectionExt, Model, OrderSpec,
    OrderSpecs, RelataError, Result, Row,
};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Rows fetched per round trip by [`Selector::iter`] unless overridden.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

//------------------------------------------------------------------------------
// Selector Definition
//------------------------------------------------------------------------------

/// Read-only query over one table.
///
/// Positions are zero-based within the ordering given by the order terms.
/// Without any order term the store's natural scan order applies, which for a
/// plain SQLite table is row id order.
pub struct Selector<M: 'static> {
    conn: Arc<dyn Connection>,
    condition: Condition<M>,
    orders: OrderSpecs<M>,
    limit: Option<usize>,
    offset: Option<usize>,
    page: Option<usize>,
    per: Option<usize>,
    batch_size: usize,
}

impl<M: 'static> Clone for Selector<M> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            condition: self.condition.clone(),
            orders: self.orders.clone(),
            limit: self.limit,
            offset: self.offset,
            page: self.page,
            per: self.per,
            batch_size: self.batch_size,
        }
    }
}

impl<M: 'static> fmt::Debug for Selector<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("condition", &self.condition)
            .field("orders", &self.orders)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl<M: Model> Conditional<M> for Selector<M> {
    fn condition(&self) -> &Condition<M> {
        &self.condition
    }

    fn condition_mut(&mut self) -> &mut Condition<M> {
        &mut self.condition
    }
}

impl<M: Model> Selector<M> {
    pub fn new(conn: Arc<dyn Connection>) -> Self {
        Self::from_parts(conn, Condition::new(ColumnNaming::Qualified), OrderSpecs::new())
    }

    pub(crate) fn from_parts(
        conn: Arc<dyn Connection>,
        condition: Condition<M>,
        orders: OrderSpecs<M>,
    ) -> Self {
        Self {
            conn,
            condition,
            orders,
            limit: None,
            offset: None,
            page: None,
            per: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    //--------------------------------------------------------------------------
    // Builder methods
    //--------------------------------------------------------------------------

    pub fn order_by(mut self, spec: OrderSpec<M>) -> Self {
        self.orders.push(spec);
        self
    }

    pub fn order_by_asc(self, column: &'static ColumnDef<M>) -> Self {
        self.order_by(OrderSpec::asc(column))
    }

    pub fn order_by_desc(self, column: &'static ColumnDef<M>) -> Self {
        self.order_by(OrderSpec::desc(column))
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Selects page `page` (1-based) of `per` rows. Overrides `limit`/`offset`
    /// once `per` is set.
    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per(mut self, per: usize) -> Self {
        self.per = Some(per);
        self
    }

    /// Rows fetched per round trip when iterating.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Restricts the selection to the row with the given row id.
    pub fn where_rowid(mut self, rowid: i64) -> Self {
        self.condition.push_rowid(rowid);
        self
    }

    #[inline]
    pub fn order_specs(&self) -> &OrderSpecs<M> {
        &self.orders
    }

    #[inline]
    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.conn
    }

    fn effective_window(&self) -> (Option<usize>, Option<usize>) {
        match self.per {
            Some(per) => {
                let page = self.page.unwrap_or(1).saturating_sub(1);
                (Some(per), Some(page.saturating_mul(per)))
            }
            None => (self.limit, self.offset),
        }
    }

    //--------------------------------------------------------------------------
    // SQL generation
    //--------------------------------------------------------------------------

    /// `SELECT <columns> FROM ... [WHERE] [ORDER BY] [LIMIT/OFFSET]`
    pub fn build_query_with_columns(&self, columns: &str) -> String {
        let (limit, offset) = self.effective_window();
        self.render(columns, limit, offset)
    }

    /// The full query selecting every schema column.
    pub fn build_query(&self) -> String {
        self.build_query_with_columns(&M::schema().select_columns())
    }

    fn render(&self, columns: &str, limit: Option<usize>, offset: Option<usize>) -> String {
        let mut sql = format!(
            "SELECT {columns} FROM {}",
            M::schema().escaped_table_name()
        );
        helpers::r#where(&mut sql, &self.condition);
        helpers::order_by(&mut sql, &self.orders);
        helpers::limit_offset(&mut sql, limit, offset);
        sql
    }

    fn fetch(&self, limit: Option<usize>, offset: Option<usize>) -> Result<Vec<M>> {
        let schema = M::schema();
        let sql = self.render(&schema.select_columns(), limit, offset);
        let rows = self.conn.query(&sql, self.condition.bind_args())?;
        let labels = schema.labels();
        rows.into_iter()
            .map(|row: Row| M::from_row(&row.with_labels(labels.clone())))
            .collect()
    }

    //--------------------------------------------------------------------------
    // Execution
    //--------------------------------------------------------------------------

    /// Number of matching rows. Limit and offset are ignored.
    pub fn count(&self) -> Result<usize> {
        let mut sql = format!("SELECT COUNT(*) FROM {}", M::schema().escaped_table_name());
        helpers::r#where(&mut sql, &self.condition);
        self.conn.query_count(&sql, self.condition.bind_args())
    }

    /// Same answer as `count() == 0`, probing a single row.
    pub fn is_empty(&self) -> Result<bool> {
        let mut sql = format!("SELECT 1 FROM {}", M::schema().escaped_table_name());
        helpers::r#where(&mut sql, &self.condition);
        sql.push_str(" LIMIT 1");
        Ok(self.conn.query(&sql, self.condition.bind_args())?.is_empty())
    }

    /// The row at `position`, or [`RelataError::NotFound`].
    pub fn get(&self, position: usize) -> Result<M> {
        self.get_or_null(position)?
            .ok_or(RelataError::NotFound { position })
    }

    /// The row at `position`, if there is one.
    pub fn get_or_null(&self, position: usize) -> Result<Option<M>> {
        Ok(self.fetch(Some(1), Some(position))?.into_iter().next())
    }

    /// The first row within the current limit/offset window.
    pub fn value(&self) -> Result<M> {
        self.value_or_null()?
            .ok_or(RelataError::NotFound { position: 0 })
    }

    pub fn value_or_null(&self) -> Result<Option<M>> {
        let (_, offset) = self.effective_window();
        Ok(self.fetch(Some(1), offset)?.into_iter().next())
    }

    /// Every row within the current limit/offset window.
    pub fn to_list(&self) -> Result<Vec<M>> {
        let (limit, offset) = self.effective_window();
        self.fetch(limit, offset)
    }

    /// Lazy cursor over the selection, fetching `batch_size` rows at a time.
    /// Each call starts a fresh pass over the store.
    pub fn iter(&self) -> Iter<M> {
        let (limit, offset) = self.effective_window();
        Iter {
            selector: self.clone(),
            buffer: VecDeque::new(),
            next_offset: offset.unwrap_or(0),
            remaining: limit,
            done: false,
        }
    }
}

impl<M: Model> IntoIterator for &Selector<M> {
    type Item = Result<M>;
    type IntoIter = Iter<M>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//------------------------------------------------------------------------------
// Iter
//------------------------------------------------------------------------------

/// Paged cursor returned by [`Selector::iter`]. Stops after the first error.
pub struct Iter<M: 'static> {
    selector: Selector<M>,
    buffer: VecDeque<M>,
    next_offset: usize,
    remaining: Option<usize>,
    done: bool,
}

impl<M: Model> Iter<M> {
    fn refill(&mut self) -> Result<()> {
        let batch = match self.remaining {
            Some(remaining) => remaining.min(self.selector.batch_size),
            None => self.selector.batch_size,
        };
        if batch == 0 {
            self.done = true;
            return Ok(());
        }
        let models = self.selector.fetch(Some(batch), Some(self.next_offset))?;
        if models.len() < batch {
            self.done = true;
        }
        self.next_offset += models.len();
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= models.len();
        }
        self.buffer.extend(models);
        Ok(())
    }
}

impl<M: Model> Iterator for Iter<M> {
    type Item = Result<M>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.done {
            if let Err(e) = self.refill() {
                self.done = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
