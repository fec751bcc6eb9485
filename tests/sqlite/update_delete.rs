use crate::common::{User, ages, by_age, col, seed, setup_db};
use relata::RelataError;
use relata::prelude::*;

#[test]
fn test_update_through_relation_respects_filter() {
    let db = setup_db();
    seed(&db, &[("a", 10), ("b", 20), ("c", 30)]);

    let changed = by_age(&db)
        .r#where(col("age"), Op::GtEq, 20)
        .updater()
        .set(col("age"), 99)
        .execute()
        .unwrap();
    assert_eq!(changed, 2);
    assert_eq!(ages(&by_age(&db)), vec![10, 99, 99]);
}

#[test]
fn test_update_serialized_value_from_model() {
    let db = setup_db();
    seed(&db, &[("a", 10)]);
    let users = by_age(&db);

    let mut a = users.get(0).unwrap();
    a.email = Some("a@example.com".into());
    users
        .updater()
        .r#where(col("id"), Op::Eq, a.id)
        .set_serialized(col("email"), &a)
        .execute()
        .unwrap();
    assert_eq!(users.reload(&a).unwrap(), Some(a));
}

#[test]
fn test_update_without_assignments_is_rejected() {
    let db = setup_db();
    let err = db.relation::<User>().updater().execute().unwrap_err();
    assert!(matches!(err, RelataError::InvalidArgument(_)));
}

#[test]
fn test_update_to_null() {
    let db = setup_db();
    seed(&db, &[("a", 10)]);
    let users = db.relation::<User>();
    users.updater().set(col("email"), "x@y").execute().unwrap();
    users.updater().set(col("email"), Value::Null).execute().unwrap();
    assert_eq!(users.where_null(col("email")).count().unwrap(), 1);
}

#[test]
fn test_delete_through_relation_respects_filter() {
    let db = setup_db();
    seed(&db, &[("a", 10), ("b", 20), ("c", 30)]);

    let deleted = by_age(&db)
        .r#where(col("age"), Op::Lt, 25)
        .deleter()
        .execute()
        .unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(ages(&by_age(&db)), vec![30]);

    let nothing = by_age(&db)
        .r#where(col("name"), Op::Eq, "zzz")
        .deleter()
        .execute()
        .unwrap();
    assert_eq!(nothing, 0);
}
