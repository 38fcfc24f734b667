//! Test that an email address can only be registered once.

use crate::e2e_tests::helpers::*;
use crate::storage::DatabaseError;

#[test]
fn test_distinct_emails_both_resolve() {
    let env = TestEnv::new();
    let mut db = env.open();

    let first = db
        .create_user("gina", "gina@example.com", "pw1")
        .expect("first user");
    env.clock.advance(1);
    let second = db
        .create_user("hal", "hal@example.com", "pw2")
        .expect("second user");

    assert_ne!(first, second);
    assert_eq!(db.get_user_by_email("gina@example.com").expect("gina").id, first);
    assert_eq!(db.get_user_by_email("hal@example.com").expect("hal").id, second);
}

#[test]
fn test_duplicate_email_rejected_after_reopen() {
    let env = TestEnv::new();
    {
        let mut db = env.open();
        db.create_user("ivy", "ivy@example.com", "pw")
            .expect("create user");
    }

    let mut db = env.open();
    let err = db
        .create_user("ivy2", "ivy@example.com", "other")
        .expect_err("email already taken");
    assert!(matches!(err, DatabaseError::AlreadyExists { .. }));
    assert_eq!(db.get_stats().btree.user_count, 1);
    assert_eq!(db.get_stats().other.email_index_size, 1);
}

#[test]
fn test_seeded_admin_email_is_taken() {
    let env = TestEnv::new();
    let mut db = env.open_seeded();

    assert!(matches!(
        db.create_user("root", "admin@fitnessquest.com", "pw"),
        Err(DatabaseError::AlreadyExists { .. })
    ));
}

#[test]
fn test_unknown_email_is_not_found() {
    let env = TestEnv::new();
    let db = env.open();

    assert!(matches!(
        db.get_user_by_email("nobody@example.com"),
        Err(DatabaseError::NotFound { .. })
    ));
}
