use crate::common::{User, by_age, col, seed, setup_db};
use relata::core::ChangeKind;
use relata::prelude::*;
use std::time::Duration;

#[test]
fn test_query_observable_emits_after_changes() {
    let db = setup_db();
    let users = by_age(&db);
    let mut changes = users.create_query_observable();
    assert!(changes.try_next().is_none());

    users.insert(|| User::new("a", 10)).unwrap();
    let selector = changes.next_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(selector.count().unwrap(), 1);
    assert_eq!(selector.get(0).unwrap().name, "a");
}

#[test]
fn test_observable_is_hot() {
    let db = setup_db();
    seed(&db, &[("a", 10)]);
    let users = by_age(&db);

    let mut changes = users.create_query_observable();
    assert!(changes.try_next().is_none());

    users.updater().set(col("age"), 11).execute().unwrap();
    assert!(changes.try_next().is_some());
    assert!(changes.try_next().is_none());
}

#[test]
fn test_unchanged_writes_do_not_emit() {
    let db = setup_db();
    let users = by_age(&db);
    let mut changes = users.create_query_observable();

    let deleted = users
        .r#where(col("name"), Op::Eq, "nobody")
        .deleter()
        .execute()
        .unwrap();
    assert_eq!(deleted, 0);
    assert!(changes.try_next().is_none());
}

#[test]
#[allow(deprecated)]
fn test_event_observable_carries_kind() {
    let db = setup_db();
    let users = by_age(&db);
    let mut changes = users.create_event_observable();

    let id = users.insert(|| User::new("a", 10)).unwrap();
    let stored = users.get(0).unwrap();
    assert_eq!(stored.id, id);
    users.delete_item(&stored).unwrap();

    let inserted = changes.next_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(inserted.kind, ChangeKind::Insert);
    let deleted = changes.next_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(deleted.kind, ChangeKind::Delete);
    assert!(deleted.selector.is_empty().unwrap());
}

#[test]
fn test_observable_from_another_thread() {
    let db = setup_db();
    let users = by_age(&db);
    let changes = users.create_query_observable();

    let writer = {
        let users = users.clone();
        std::thread::spawn(move || {
            users.insert(|| User::new("a", 10)).unwrap();
        })
    };

    let selector = changes.take(1).next().unwrap();
    writer.join().unwrap();
    assert_eq!(selector.count().unwrap(), 1);
}
