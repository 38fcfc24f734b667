//! Test that damaged collection files never stop the database from opening.
//!
//! A damaged collection loads as empty or as the records before the damage.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::FileFormat;
use crate::e2e_tests::helpers::*;
use crate::storage::DatabaseError;
use crate::storage::codec::write_u64;
use crate::storage::file::{DATA_FILES, EXERCISES_FILE, GRAPH_FILE, QUESTS_FILE, USERS_FILE};

fn create_three_users(env: &TestEnv) {
    let mut db = env.open();
    for name in ["kim", "lee", "max"] {
        db.create_user(name, &format!("{name}@example.com"), "pw")
            .expect("create user");
        env.clock.advance(1);
    }
}

#[test]
fn test_truncated_tree_file_loads_prefix() {
    let env = TestEnv::new();
    create_three_users(&env);

    let path = env.path().join(USERS_FILE);
    let bytes = std::fs::read(&path).expect("read users");
    std::fs::write(&path, &bytes[..bytes.len() - 5]).expect("truncate users");

    let db = env.open();
    assert_eq!(db.get_stats().btree.user_count, 2);
    assert!(db.get_user_by_email("kim@example.com").is_ok());
    assert!(db.get_user_by_email("lee@example.com").is_ok());
    // The index survived but the record it points to did not
    assert_eq!(db.get_stats().other.email_index_size, 3);
    assert!(matches!(
        db.get_user_by_email("max@example.com"),
        Err(DatabaseError::NotFound {
            collection: "users",
            ..
        })
    ));
}

#[test]
fn test_empty_and_oversized_headers() {
    let env = TestEnv::new();
    {
        let mut db = env.open_seeded();
        db.add_quest(quest("Q700", 2)).expect("add quest");
    }

    let mut oversized = Vec::new();
    write_u64(&mut oversized, 2_000_000);
    std::fs::write(env.path().join(EXERCISES_FILE), &oversized).expect("write exercises");
    std::fs::write(env.path().join(GRAPH_FILE), []).expect("empty graph");

    let db = env.open_seeded();
    let stats = db.get_stats();
    assert_eq!(stats.btree.exercise_count, 0);
    assert_eq!(stats.other.graph_edges, 0);
    assert_eq!(stats.btree.quest_count, 2);
    assert_eq!(stats.btree.user_count, 1);
}

#[test]
fn test_random_garbage_does_not_crash() {
    let mut rng = StdRng::seed_from_u64(7);

    for round in 0..20 {
        let env = TestEnv::new();
        for name in DATA_FILES {
            let len = rng.random_range(0..256);
            let garbage: Vec<u8> = (0..len).map(|_| rng.random()).collect();
            std::fs::write(env.path().join(name), garbage).expect("write garbage");
        }

        let db = env.open();
        let stats = db.get_stats();
        assert!(stats.btree.user_count <= 32, "round {round}: {stats:?}");
    }
}

#[test]
fn test_corrupt_checksummed_file_loads_empty() {
    let env = TestEnv::new();
    let config = env.config().with_file_format(FileFormat::Checksummed);
    {
        let mut db = env.open_with(config.clone());
        db.add_quest(quest("Q800", 1)).expect("add quest");
        db.create_user("ned", "ned@example.com", "pw")
            .expect("create user");
    }

    let path = env.path().join(QUESTS_FILE);
    let mut bytes = std::fs::read(&path).expect("read quests");
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x55;
    std::fs::write(&path, &bytes).expect("corrupt quests");

    let db = env.open_with(config);
    assert!(db.get_all_quests().is_empty());
    // Other collections are unaffected
    assert_eq!(db.get_stats().other.priority_queue_size, 1);
    assert!(db.get_user_by_email("ned@example.com").is_ok());
}

#[test]
fn test_unreadable_file_fails_open() {
    let env = TestEnv::new();
    std::fs::create_dir(env.path().join(USERS_FILE)).expect("directory in place of users.dat");

    let result = crate::storage::Database::open(env.config());
    assert!(matches!(result, Err(DatabaseError::Io(_))));
}
