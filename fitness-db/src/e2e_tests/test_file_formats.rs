//! Test the on-disk layouts and write strategies.

use crate::config::FileFormat;
use crate::e2e_tests::helpers::*;
use crate::storage::file::{DATA_FILES, GRAPH_FILE, MAGIC, USERS_FILE};
use crate::storage::{Database, DatabaseError, FileError};

#[test]
fn test_legacy_graph_layout() {
    let env = TestEnv::new();
    {
        let mut db = env.open();
        db.add_exercise(exercise("EX002", &["EX001"]))
            .expect("add exercise");
    }

    let mut expected = Vec::new();
    expected.extend_from_slice(&1u64.to_le_bytes());
    expected.extend_from_slice(&5u64.to_le_bytes());
    expected.extend_from_slice(b"EX001");
    expected.extend_from_slice(&5u64.to_le_bytes());
    expected.extend_from_slice(b"EX002");
    expected.extend_from_slice(&1i32.to_le_bytes());

    let bytes = std::fs::read(env.path().join(GRAPH_FILE)).expect("read graph");
    assert_eq!(bytes, expected);
}

#[test]
fn test_legacy_tree_records_start_with_key() {
    let env = TestEnv::new();
    let user_id = {
        let mut db = env.open();
        db.create_user("olga", "olga@example.com", "pw")
            .expect("create user")
    };

    let bytes = std::fs::read(env.path().join(USERS_FILE)).expect("read users");
    let id_len = user_id.len();

    assert_eq!(&bytes[..8], &1u64.to_le_bytes());
    assert_eq!(&bytes[8..16], &(id_len as u64).to_le_bytes());
    assert_eq!(&bytes[16..16 + id_len], user_id.as_bytes());
    // The record repeats the id as its first field
    assert_eq!(&bytes[16 + id_len..24 + id_len], &(id_len as u64).to_le_bytes());
}

#[test]
fn test_checksummed_atomic_round_trip() {
    let env = TestEnv::new();
    let config = env
        .config()
        .with_seed_on_empty(true)
        .with_file_format(FileFormat::Checksummed)
        .with_atomic_writes(true);

    let stats = {
        let mut db = env.open_with(config.clone());
        db.add_quest(quest("Q900", 7)).expect("add quest");
        db.start_workout("ADMIN001").expect("start workout");
        db.get_stats()
    };

    for name in DATA_FILES {
        let bytes = std::fs::read(env.path().join(name)).expect("read data file");
        assert_eq!(&bytes[..8], &MAGIC, "{name} is framed");
        assert!(
            !env.path().join(format!("{name}.tmp")).exists(),
            "{name}.tmp renamed away"
        );
    }

    let db = env.open_with(config);
    assert_eq!(db.get_stats(), stats);
    assert_eq!(db.get_quest("Q900").expect("Q900").priority, 7);
    assert_eq!(db.get_user_workouts("ADMIN001").len(), 1);
}

#[test]
fn test_switching_format_fails_open_and_keeps_data() {
    let env = TestEnv::new();
    {
        let mut db = env.open();
        db.create_user("quinn", "quinn@example.com", "pw")
            .expect("create user");
    }

    let checksummed = env
        .config()
        .with_seed_on_empty(true)
        .with_file_format(FileFormat::Checksummed);
    let err = Database::open_with_time_source(checksummed, Box::new(env.clock.clone()))
        .expect_err("legacy files under a checksummed config");
    assert!(matches!(
        err,
        DatabaseError::File(FileError::FormatMismatch {
            configured: FileFormat::Checksummed
        })
    ));

    let db = env.open();
    assert_eq!(db.get_stats().btree.user_count, 1);
    assert_eq!(
        db.get_user_by_email("quinn@example.com")
            .expect("user kept")
            .username,
        "quinn"
    );
}

#[test]
fn test_checksummed_files_are_not_read_as_legacy() {
    let env = TestEnv::new();
    let checksummed = env.config().with_file_format(FileFormat::Checksummed);
    {
        let mut db = env.open_with(checksummed.clone());
        db.add_quest(quest("Q901", 3)).expect("add quest");
    }

    let err = Database::open(env.config().with_seed_on_empty(true))
        .expect_err("checksummed files under a legacy config");
    assert!(matches!(
        err,
        DatabaseError::File(FileError::FormatMismatch {
            configured: FileFormat::Legacy
        })
    ));

    let db = env.open_with(checksummed);
    assert_eq!(db.get_quest("Q901").expect("quest kept").priority, 3);
}
