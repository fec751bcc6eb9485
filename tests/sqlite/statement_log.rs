#![cfg(feature = "tracing")]

use crate::common::{User, by_age, col, seed, setup_db};
use relata::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Metadata, Subscriber};

/// Counts events that carry a `sql` field.
#[derive(Default)]
struct StatementCounter {
    statements: Arc<AtomicUsize>,
}

impl Subscriber for StatementCounter {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _: &Id, _: &Record<'_>) {}

    fn record_follows_from(&self, _: &Id, _: &Id) {}

    fn event(&self, event: &Event<'_>) {
        if event.metadata().fields().field("sql").is_some() {
            self.statements.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn enter(&self, _: &Id) {}

    fn exit(&self, _: &Id) {}
}

fn statements_logged(work: impl FnOnce()) -> usize {
    let counter = StatementCounter::default();
    let statements = counter.statements.clone();
    tracing::subscriber::with_default(counter, work);
    statements.load(Ordering::SeqCst)
}

#[test]
fn test_each_write_is_logged_once() {
    let db = setup_db();
    seed(&db, &[("a", 10), ("b", 20)]);
    let users = by_age(&db);

    let inserted = statements_logged(|| {
        users.inserter().execute(&User::new("c", 30)).unwrap();
    });
    assert_eq!(inserted, 1);

    let updated = statements_logged(|| {
        users.updater().set(col("age"), 40).execute().unwrap();
    });
    assert_eq!(updated, 1);

    let deleted = statements_logged(|| {
        users.deleter().execute().unwrap();
    });
    assert_eq!(deleted, 1);
}
