use crate::common::{User, col, seed, setup_db};
use relata::prelude::*;

fn selector(db: &Database) -> Selector<User> {
    Selector::new(db.shared()).order_by_asc(col("age"))
}

#[test]
fn test_limit_and_offset_window() {
    let db = setup_db();
    seed(&db, &[("a", 10), ("b", 20), ("c", 30), ("d", 40)]);

    let window = selector(&db).limit(2).offset(1);
    let names: Vec<_> = window.to_list().unwrap().into_iter().map(|u| u.name).collect();
    assert_eq!(names, vec!["b", "c"]);
    assert_eq!(window.value().unwrap().name, "b");
    // Count ignores the window.
    assert_eq!(window.count().unwrap(), 4);
}

#[test]
fn test_pages_are_one_based() {
    let db = setup_db();
    seed(&db, &[("a", 10), ("b", 20), ("c", 30), ("d", 40), ("e", 50)]);

    let page = |n| -> Vec<String> {
        selector(&db)
            .per(2)
            .page(n)
            .to_list()
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect()
    };
    assert_eq!(page(1), vec!["a", "b"]);
    assert_eq!(page(2), vec!["c", "d"]);
    assert_eq!(page(3), vec!["e"]);
    assert!(page(4).is_empty());
}

#[test]
fn test_iter_crosses_batches() {
    let db = setup_db();
    let pairs: Vec<(String, i64)> = (0..7).map(|i| (format!("user{i}"), i * 10)).collect();
    let pairs: Vec<(&str, i64)> = pairs.iter().map(|(n, a)| (n.as_str(), *a)).collect();
    seed(&db, &pairs);

    let all: Vec<i64> = selector(&db)
        .batch_size(3)
        .iter()
        .map(|u| u.unwrap().age)
        .collect();
    assert_eq!(all, vec![0, 10, 20, 30, 40, 50, 60]);

    let windowed: Vec<i64> = selector(&db)
        .batch_size(2)
        .offset(2)
        .limit(3)
        .iter()
        .map(|u| u.unwrap().age)
        .collect();
    assert_eq!(windowed, vec![20, 30, 40]);
}

#[test]
fn test_conditions() {
    let db = setup_db();
    seed(&db, &[("a", 10), ("b", 20), ("c", 30), ("d", 40)]);
    db.relation::<User>()
        .updater()
        .r#where(col("name"), Op::Eq, "c")
        .set(col("email"), "c@example.com")
        .execute()
        .unwrap();

    let in_list = selector(&db).where_in(col("name"), ["a", "d", "zzz"]);
    assert_eq!(in_list.count().unwrap(), 2);

    let not_in = selector(&db).where_not_in(col("name"), ["a", "d"]);
    assert_eq!(not_in.count().unwrap(), 2);

    let with_email = selector(&db).where_not_null(col("email"));
    assert_eq!(with_email.value().unwrap().name, "c");
    assert_eq!(selector(&db).where_null(col("email")).count().unwrap(), 3);

    let either = selector(&db)
        .r#where(col("age"), Op::Lt, 15)
        .or()
        .r#where(col("age"), Op::Gt, 35);
    let names: Vec<_> = either.to_list().unwrap().into_iter().map(|u| u.name).collect();
    assert_eq!(names, vec!["a", "d"]);

    let like = selector(&db).r#where(col("email"), Op::Like, "%@example.com");
    assert_eq!(like.count().unwrap(), 1);
}

#[test]
fn test_empty_in_list_matches_nothing() {
    let db = setup_db();
    seed(&db, &[("a", 10)]);

    let none = selector(&db).where_in(col("name"), Vec::<String>::new());
    assert!(none.is_empty().unwrap());

    let all = selector(&db).where_not_in(col("name"), Vec::<String>::new());
    assert_eq!(all.count().unwrap(), 1);
}

#[test]
fn test_raw_clause_argument_count_is_checked() {
    let db = setup_db();
    seed(&db, &[("a", 10), ("b", 20)]);

    let raw = selector(&db)
        .where_raw("\"users\".\"age\" BETWEEN ? AND ?", [15, 25])
        .unwrap();
    assert_eq!(raw.value().unwrap().name, "b");

    let err = selector(&db)
        .where_raw("\"users\".\"age\" = ?", [1, 2])
        .unwrap_err();
    assert!(matches!(err, relata::RelataError::InvalidArgument(_)));
}

#[test]
fn test_where_rowid() {
    let db = setup_db();
    let id = db.relation::<User>().insert(|| User::new("a", 10)).unwrap();

    let found = Selector::<User>::new(db.shared()).where_rowid(id).value().unwrap();
    assert_eq!(found.id, id);
    assert!(
        Selector::<User>::new(db.shared())
            .where_rowid(id + 1)
            .value_or_null()
            .unwrap()
            .is_none()
    );
}
