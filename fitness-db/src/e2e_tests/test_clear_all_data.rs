//! Test that clearing drops everything and restores the fixture data.

use crate::e2e_tests::helpers::*;
use crate::storage::file::DATA_FILES;

#[test]
fn test_clear_restores_fixture() {
    let env = TestEnv::new();
    let seeded_stats = env.open_seeded().get_stats();

    let mut db = env.open_seeded();
    let user_id = db
        .create_user("jo", "jo@example.com", "pw")
        .expect("create user");
    db.add_exercise(exercise("EX500", &["EX001"]))
        .expect("add exercise");
    db.start_workout(&user_id).expect("start workout");
    db.add_quest(quest("Q500", 3)).expect("add quest");

    db.clear_all_data().expect("clear");

    assert_eq!(db.get_stats(), seeded_stats);
    assert!(db.get_user(&user_id).is_err());
    assert!(db.get_user_by_email("jo@example.com").is_err());
    assert!(db.get_exercise("EX500").is_err());
    assert!(db.get_user("ADMIN001").is_ok());
    for name in DATA_FILES {
        assert!(env.path().join(name).exists(), "{name} rewritten by seed");
    }

    drop(db);
    let db = env.open();
    assert_eq!(db.get_stats(), seeded_stats);
}

#[test]
fn test_clear_seeds_even_when_seeding_disabled() {
    let env = TestEnv::new();
    let mut db = env.open();
    db.add_quest(quest("Q1", 1)).expect("add quest");

    db.clear_all_data().expect("clear");

    let quests = db.get_all_quests();
    assert_eq!(quests.len(), 1);
    assert_eq!(quests[0].id, "Q001");
    assert_eq!(quests[0].title, "Daily Challenge");
    assert_eq!(quests[0].rewards, vec!["100 XP"]);
}

#[test]
fn test_seeded_fixture_contents() {
    let env = TestEnv::new();
    let db = env.open_seeded();

    let push_up = db.get_exercise("EX001").expect("EX001");
    assert_eq!(push_up.name, "Push-up");
    assert_eq!(push_up.calories_per_minute, 8);
    assert_eq!(push_up.next_exercises, vec!["EX002"]);

    let squat = db.get_exercise("EX002").expect("EX002");
    assert_eq!(squat.name, "Squat");
    assert_eq!(squat.calories_per_minute, 7);
    assert_eq!(squat.prerequisites, vec!["EX001"]);

    let admin = db.get_user("ADMIN001").expect("admin");
    assert_eq!(admin.username, "Admin");
    assert_eq!(admin.email, "admin@fitnessquest.com");

    let daily = db.get_quest("Q001").expect("Q001");
    assert_eq!(daily.priority, 1);
    assert_eq!(daily.required_exercises, vec!["EX001", "EX002"]);

    let graph = db.get_exercise_graph();
    assert_eq!(graph.len(), 1);
    assert_eq!((graph[0].from.as_str(), graph[0].to.as_str()), ("EX001", "EX002"));
}
