//! SQL fragment assembly shared by the statement builders

use relata_core::{Condition, OrderSpecs};

/// Appends ` WHERE <clause>` when `condition` has any terms.
pub(crate) fn r#where<M>(sql: &mut String, condition: &Condition<M>) {
    if let Some(clause) = condition.build_where_clause() {
        sql.push_str(" WHERE ");
        sql.push_str(&clause);
    }
}

/// Appends ` ORDER BY <terms>`, or nothing for an empty ordering.
pub(crate) fn order_by<M: 'static>(sql: &mut String, orders: &OrderSpecs<M>) {
    if let Some(terms) = orders.build_ordering_terms() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&terms);
    }
}

/// Appends `LIMIT`/`OFFSET`. SQLite only accepts `OFFSET` after a `LIMIT`,
/// so an offset on its own is paired with `LIMIT -1` (no limit).
///
/// SQLite binds integers as `i64`; larger values are clamped to `i64::MAX`,
/// which no table can reach.
pub(crate) fn limit_offset(sql: &mut String, limit: Option<usize>, offset: Option<usize>) {
    match (limit.map(clamp), offset.map(clamp)) {
        (None, None) => {}
        (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
        (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
    }
}

#[inline]
fn clamp(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
