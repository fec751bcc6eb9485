use crate::common::{User, by_age, col, setup_db};
use relata::prelude::*;
use relata::sqlite::create_model;

#[test]
fn test_insert_assigns_ids() {
    let db = setup_db();
    let users = db.relation::<User>();

    let first = users.insert(|| User::new("a", 10)).unwrap();
    let second = users.insert(|| User::new("b", 20)).unwrap();
    assert!(second > first);
    assert_eq!(users.count().unwrap(), 2);
}

#[test]
fn test_plain_insert_fails_on_conflict() {
    let db = setup_db();
    let users = db.relation::<User>();
    users.insert(|| User::new("a", 10)).unwrap();

    let err = users.insert(|| User::new("a", 99)).unwrap_err();
    assert!(err.is_store_error());
    assert_eq!(users.count().unwrap(), 1);
}

#[test]
fn test_ignore_policy_keeps_existing_row() {
    let db = setup_db();
    let users = by_age(&db);
    users.insert(|| User::new("a", 10)).unwrap();
    users.insert(|| User::new("b", 20)).unwrap();
    let events = db.subscribe();

    let skipped = users
        .inserter_with(OnConflict::Ignore, true)
        .execute(&User::new("a", 99))
        .unwrap();
    assert_eq!(skipped, None);
    assert!(events.try_recv().is_err());

    let stored = users.get(0).unwrap();
    assert_eq!(stored.age, 10);
    assert_eq!(users.count().unwrap(), 2);

    let written = users
        .inserter_with(OnConflict::Ignore, true)
        .execute(&User::new("c", 30))
        .unwrap();
    assert_eq!(written, Some(users.get(2).unwrap().id));
    assert!(events.try_recv().is_ok());
}

#[test]
fn test_upsert_replaces_by_primary_key() {
    let db = setup_db();
    let users = by_age(&db);
    let id = users.insert(|| User::new("a", 10)).unwrap();

    let replacement = User {
        id,
        ..User::new("a", 42).with_email("a@example.com")
    };
    assert_eq!(users.upsert(&replacement).unwrap(), id);
    assert_eq!(users.to_list().unwrap(), vec![replacement]);
}

#[test]
fn test_execute_all_is_atomic() {
    let db = setup_db();
    let users = db.relation::<User>();
    let inserter = users.inserter();

    let ids = inserter
        .execute_all(vec![User::new("a", 10), User::new("b", 20)])
        .unwrap();
    assert_eq!(ids.len(), 2);

    let err = inserter.execute_all(vec![User::new("c", 30), User::new("a", 40)]);
    assert!(err.is_err());
    // "c" was rolled back with the failing "a".
    assert_eq!(users.count().unwrap(), 2);
}

#[test]
fn test_create_model_returns_stored_row() {
    let db = setup_db();
    let created = create_model(&db.shared(), || User::new("a", 10).with_email("a@x")).unwrap();

    assert!(created.id > 0);
    assert_eq!(created.email.as_deref(), Some("a@x"));
    assert_eq!(db.relation::<User>().reload(&created).unwrap(), Some(created));
}

#[test]
fn test_execute_as_single_runs_on_subscribe() {
    let db = setup_db();
    let users = db.relation::<User>();

    let single = users.inserter().execute_as_single(User::new("a", 10));
    assert!(users.is_empty().unwrap());

    let id = single.subscribe_on(&Immediate).wait().unwrap().unwrap();
    assert_eq!(users.get(0).unwrap().id, id);
    assert_eq!(
        users
            .r#where(col("id"), Op::Eq, id)
            .get(0)
            .unwrap()
            .name,
        "a"
    );
}
