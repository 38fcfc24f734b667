//! Test the persistence self-check.

use crate::e2e_tests::helpers::*;
use crate::storage::DatabaseError;

#[test]
fn test_self_check_passes() {
    let env = TestEnv::new();
    let mut db = env.open_seeded();

    assert!(db.test_persistence().expect("self-check"));
    assert_eq!(
        db.get_user_by_email("test@test.com")
            .expect("test user")
            .username,
        "TestUser"
    );
}

#[test]
fn test_self_check_twice_reports_existing_user() {
    let env = TestEnv::new();
    let mut db = env.open();

    assert!(db.test_persistence().expect("first self-check"));
    assert!(matches!(
        db.test_persistence(),
        Err(DatabaseError::AlreadyExists { .. })
    ));
}
