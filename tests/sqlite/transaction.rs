use crate::common::{CREATE_USERS, User, setup_db};
use relata::RelataError;
use relata::core::ChangeKind;
use relata::prelude::*;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc::TryRecvError;

#[test]
fn test_transaction_commit() {
    let db = setup_db();
    let users = db.relation::<User>();

    let ids = db
        .transaction(|| {
            assert!(db.in_transaction());
            let a = users.insert(|| User::new("a", 10))?;
            let b = users.insert(|| User::new("b", 20))?;
            Ok((a, b))
        })
        .unwrap();

    assert!(ids.1 > ids.0);
    assert!(!db.in_transaction());
    assert_eq!(users.count().unwrap(), 2);
}

#[test]
fn test_transaction_rollback_on_error() {
    let db = setup_db();
    let users = db.relation::<User>();

    let result: relata::Result<()> = db.transaction(|| {
        users.insert(|| User::new("a", 10))?;
        Err(RelataError::Other("boom".into()))
    });

    assert!(matches!(result, Err(RelataError::Other(msg)) if msg == "boom"));
    assert!(users.is_empty().unwrap());
}

#[test]
fn test_transaction_rollback_on_panic() {
    let db = setup_db();
    let users = db.relation::<User>();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _ = db.transaction(|| -> relata::Result<()> {
            users.insert(|| User::new("a", 10))?;
            panic!("unit of work panicked");
        });
    }));

    assert!(outcome.is_err());
    assert!(!db.in_transaction());
    assert!(users.is_empty().unwrap());
    // The connection is usable again.
    users.insert(|| User::new("b", 20)).unwrap();
    assert_eq!(users.count().unwrap(), 1);
}

#[test]
fn test_nested_units_of_work_join_the_outer_one() {
    let db = setup_db();
    let users = db.relation::<User>();

    let result: relata::Result<()> = db.transaction(|| {
        db.transaction(|| users.insert(|| User::new("inner", 10)))?;
        assert_eq!(users.count()?, 1);
        Err(RelataError::Other("outer fails".into()))
    });

    assert!(result.is_err());
    assert!(users.is_empty().unwrap());
}

#[test]
fn test_events_are_held_until_commit() {
    let db = setup_db();
    let users = db.relation::<User>();
    let events = db.subscribe();

    db.transaction(|| {
        users.insert(|| User::new("a", 10))?;
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
        Ok(())
    })
    .unwrap();

    let event = events.try_recv().unwrap();
    assert_eq!(event.table, "users");
    assert_eq!(event.kind, ChangeKind::Insert);
}

#[test]
fn test_events_are_dropped_on_rollback() {
    let db = setup_db();
    let users = db.relation::<User>();
    let events = db.subscribe();

    let _ = db.transaction(|| -> relata::Result<()> {
        users.insert(|| User::new("a", 10))?;
        Err(RelataError::Other("abort".into()))
    });

    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn test_failed_statement_rolls_back_unit_of_work() {
    let db = setup_db();
    let users = db.relation::<User>();

    let result = db.transaction(|| {
        users.insert(|| User::new("a", 10))?;
        users.insert(|| User::new("a", 20))
    });

    assert!(result.unwrap_err().is_store_error());
    assert!(users.is_empty().unwrap());
}

#[test]
fn test_immediate_transactions() {
    let config = DatabaseConfig::in_memory().with_transaction(TransactionType::Immediate);
    let db = Database::open(&config).unwrap();
    db.execute_batch(CREATE_USERS).unwrap();
    assert_eq!(db.tx_type(), TransactionType::Immediate);

    let users = db.relation::<User>();
    db.transaction(|| users.insert(|| User::new("a", 10)))
        .unwrap();
    assert_eq!(users.count().unwrap(), 1);
}

#[test]
fn test_clones_share_connection_across_threads() {
    let db = setup_db();
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let db = db.clone();
            std::thread::spawn(move || {
                let users = db.relation::<User>();
                for i in 0..5_i64 {
                    users
                        .insert(|| User::new(&format!("t{t}-{i}"), i))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(db.relation::<User>().count().unwrap(), 20);
}
