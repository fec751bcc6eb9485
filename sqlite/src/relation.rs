//! Position-aware relations
//!
//! A [`Relation`] is a table handle carrying filter and ordering state. On top
//! of the plain statement builders it offers list-style operations that map a
//! row to its position under the current ordering, which is what a UI list
//! adapter needs: the rank of an item, deleting an item while reporting where
//! it was, and trimming the list to a given length.

use crate::builder::insert::require_row;
use crate::builder::{
    Deleter, Inserter, Iter, OnConflict, Selector, Updater, create_model,
};
use relata_core::{
    ColumnDef, ColumnNaming, Condition, Conditional, Connection, ConnectionExt,
    DataSetChangedEvent, Direction, Maybe, Model, Observable, Op, OrderSpec, OrderSpecs, Result,
    Schema, Single,
};
use std::fmt;
use std::sync::Arc;

pub struct Relation<M: 'static> {
    conn: Arc<dyn Connection>,
    condition: Condition<M>,
    orders: OrderSpecs<M>,
}

/// Copies share the connection but no filter or ordering state.
impl<M: 'static> Clone for Relation<M> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            condition: self.condition.clone(),
            orders: self.orders.clone(),
        }
    }
}

impl<M: 'static> fmt::Debug for Relation<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("condition", &self.condition)
            .field("orders", &self.orders)
            .finish_non_exhaustive()
    }
}

impl<M: Model> Conditional<M> for Relation<M> {
    fn condition(&self) -> &Condition<M> {
        &self.condition
    }

    fn condition_mut(&mut self) -> &mut Condition<M> {
        &mut self.condition
    }
}

impl<M: Model> Relation<M> {
    pub fn new(conn: Arc<dyn Connection>) -> Self {
        Self {
            conn,
            condition: Condition::new(ColumnNaming::Qualified),
            orders: OrderSpecs::new(),
        }
    }

    #[inline]
    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.conn
    }

    #[inline]
    pub fn schema(&self) -> &'static Schema<M> {
        M::schema()
    }

    /// Column references inside a relation are always table-qualified.
    pub fn build_column_name<'c>(&self, column: &'c ColumnDef<M>) -> &'c str {
        self.condition.build_column_name(column)
    }

    //--------------------------------------------------------------------------
    // Ordering
    //--------------------------------------------------------------------------

    /// Adds a tie-break level after the existing order terms.
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

    #[inline]
    pub fn order_specs(&self) -> &OrderSpecs<M> {
        &self.orders
    }

    pub fn build_ordering_terms(&self) -> Option<String> {
        self.orders.build_ordering_terms()
    }

    //--------------------------------------------------------------------------
    // Derived builders
    //--------------------------------------------------------------------------

    pub fn selector(&self) -> Selector<M> {
        Selector::from_parts(self.conn.clone(), self.condition.clone(), self.orders.clone())
    }

    pub fn updater(&self) -> Updater<M> {
        Updater::from_condition(self.conn.clone(), self.condition.clone())
    }

    pub fn deleter(&self) -> Deleter<M> {
        Deleter::from_condition(self.conn.clone(), self.condition.clone())
    }

    /// A plain `INSERT` that lets the store assign an auto id.
    pub fn inserter(&self) -> Inserter<M> {
        self.inserter_with(OnConflict::None, true)
    }

    pub fn inserter_with(&self, on_conflict: OnConflict, without_auto_id: bool) -> Inserter<M> {
        Inserter::new(self.conn.clone(), on_conflict, without_auto_id)
    }

    /// `INSERT OR REPLACE` including the primary key.
    pub fn upserter(&self) -> Inserter<M> {
        self.inserter_with(OnConflict::Replace, false)
    }

    //--------------------------------------------------------------------------
    // Reads
    //--------------------------------------------------------------------------

    pub fn count(&self) -> Result<usize> {
        self.selector().count()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.selector().is_empty()
    }

    /// The row at zero-based `position` under the current ordering.
    ///
    /// Without order terms, positions follow SQLite's scan order, which for
    /// a plain table is row id order.
    pub fn get(&self, position: usize) -> Result<M> {
        self.selector().get(position)
    }

    pub fn get_or_null(&self, position: usize) -> Result<Option<M>> {
        self.selector().get_or_null(position)
    }

    pub fn get_as_single(&self, position: usize) -> Single<M> {
        let selector = self.selector();
        Single::new(move || selector.get(position))
    }

    pub fn to_list(&self) -> Result<Vec<M>> {
        self.selector().to_list()
    }

    pub fn iter(&self) -> Iter<M> {
        self.selector().iter()
    }

    /// Fetches the stored version of `item` by primary key, ignoring the
    /// relation's filters.
    pub fn reload(&self, item: &M) -> Result<Option<M>> {
        let pk = M::schema().primary_key();
        Selector::new(self.conn.clone())
            .r#where(pk, Op::Eq, pk.get_serialized(item))
            .value_or_null()
    }

    /// The existing row at `position`, or a newly persisted model from
    /// `factory`. The new row is appended like any insert and may end up at a
    /// different position.
    pub fn get_or_create(&self, position: usize, factory: impl FnOnce() -> M) -> Result<M> {
        match self.get_or_null(position)? {
            Some(model) => Ok(model),
            None => create_model(&self.conn, factory),
        }
    }

    /// Rank of `item` under the current ordering: the number of matching rows
    /// that sort strictly before it.
    ///
    /// Rows that tie with `item` on every order term are not counted, so with
    /// duplicate sort keys this is a lower bound rather than a unique index.
    /// With no order terms the result is the number of matching rows.
    pub fn index_of(&self, item: &M) -> Result<usize> {
        self.preceding(item).count()
    }

    fn preceding(&self, item: &M) -> Selector<M> {
        // A trailing `.or()` on the relation must not leak into the order terms.
        self.orders.iter().fold(self.selector().and(), |selector, spec| {
            let column = spec.column();
            let op = match spec.direction() {
                Direction::Asc => Op::Lt,
                Direction::Desc => Op::Gt,
            };
            selector.r#where(column, op, column.get_serialized(item))
        })
    }

    //--------------------------------------------------------------------------
    // Writes
    //--------------------------------------------------------------------------

    /// Deletes `item` by primary key and reports the position it held.
    ///
    /// Position and delete run in one unit of work. The result is `None` when
    /// no row was deleted.
    pub fn delete_item(&self, item: &M) -> Result<Option<usize>> {
        self.delete_as_maybe(item).blocking_get()
    }

    /// Deferred [`Relation::delete_item`]. The position is delivered only once
    /// the unit of work has committed.
    pub fn delete_as_maybe(&self, item: &M) -> Maybe<usize> {
        let pk = M::schema().primary_key();
        let preceding = self.preceding(item);
        let deleter = self.deleter().r#where(pk, Op::Eq, pk.get_serialized(item));
        let conn = self.conn.clone();
        Single::new(move || {
            conn.transaction(|| {
                let position = preceding.count()?;
                let deleted = deleter.execute()?;
                Ok((deleted > 0).then_some(position))
            })
        })
    }

    /// Deletes every row ranked at or beyond `size` and returns how many
    /// were removed.
    pub fn truncate(&self, size: usize) -> Result<usize> {
        self.truncate_as_single(size).blocking_get()
    }

    pub fn truncate_as_single(&self, size: usize) -> Single<usize> {
        let beyond = self.selector().offset(size);
        let conn = self.conn.clone();
        Single::new(move || {
            let pk = M::schema().primary_key().qualified_name();
            let clause = format!("{pk} IN ({})", beyond.build_query_with_columns(pk));
            Deleter::<M>::new(conn)
                .where_raw(&clause, beyond.bind_args().to_vec())?
                .execute()
        })
    }

    /// Inserts the model built by `factory` and returns its row id.
    pub fn insert(&self, factory: impl FnOnce() -> M) -> Result<i64> {
        self.inserter().execute_with(factory).and_then(require_row)
    }

    pub fn insert_as_single(&self, factory: impl FnOnce() -> M + Send + 'static) -> Single<i64> {
        let inserter = self.inserter();
        Single::new(move || inserter.execute_with(factory).and_then(require_row))
    }

    pub fn upsert(&self, model: &M) -> Result<i64> {
        self.upserter().execute(model).and_then(require_row)
    }

    //--------------------------------------------------------------------------
    // Change notification
    //--------------------------------------------------------------------------

    /// Hot stream yielding this relation's selector after every committed
    /// change to the table.
    pub fn create_query_observable(&self) -> Observable<Selector<M>> {
        let selector = self.selector();
        Observable::new(self.conn.subscribe(), M::schema().table_name(), move |_| {
            selector.clone()
        })
    }

    /// Like [`Relation::create_query_observable`], also carrying the kind of change.
    #[deprecated(note = "use create_query_observable")]
    pub fn create_event_observable(&self) -> Observable<DataSetChangedEvent<Selector<M>>> {
        let selector = self.selector();
        Observable::new(self.conn.subscribe(), M::schema().table_name(), move |event| {
            DataSetChangedEvent {
                kind: event.kind,
                selector: selector.clone(),
            }
        })
    }
}

impl<M: Model> IntoIterator for &Relation<M> {
    type Item = Result<M>;
    type IntoIter = Iter<M>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
