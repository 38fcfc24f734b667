//! Test that every collection survives dropping and reopening the database.

use crate::e2e_tests::helpers::*;

#[test]
fn test_all_collections_survive_reopen() {
    let env = TestEnv::new();

    let (user_id, workout_id, users, stats);
    let (exercises, workouts, quests, graph, email_index, queue);
    {
        let mut db = env.open();

        user_id = db
            .create_user("dana", "dana@example.com", "hunter2")
            .expect("create user");
        env.clock.advance(1);
        let second_id = db
            .create_user("eli", "eli@example.com", "pw")
            .expect("create second user");

        let mut user = db.get_user(&user_id).expect("get user");
        user.experience_points = 1_200;
        user.fitness_level = 4;
        user.completed_exercises = vec!["EX100".to_string()];
        user.achievements = vec!["early_bird".to_string()];
        db.update_user(user).expect("update user");

        db.add_exercise(exercise("EX100", &[])).expect("add EX100");
        db.add_exercise(exercise("EX101", &["EX100"]))
            .expect("add EX101");

        workout_id = db.start_workout(&user_id).expect("start workout");
        env.clock.advance(600);
        db.complete_workout(&workout_id).expect("complete workout");

        db.add_quest(quest("Q100", 4)).expect("add Q100");
        db.add_quest(quest("Q101", 2)).expect("add Q101");

        users = [
            db.get_user(&user_id).expect("first user"),
            db.get_user(&second_id).expect("second user"),
        ];
        exercises = db.get_all_exercises();
        workouts = db.get_all_workouts();
        quests = db.get_all_quests();
        graph = db.get_exercise_graph().to_vec();
        email_index = db.get_email_index().to_vec();
        queue = db.get_priority_queue().to_vec();
        stats = db.get_stats();
        // Dropped without close
    }

    let mut db = env.open();

    assert_eq!(db.get_stats(), stats);
    assert_eq!(db.get_all_exercises(), exercises);
    assert_eq!(db.get_all_workouts(), workouts);
    assert_eq!(db.get_all_quests(), quests);
    assert_eq!(db.get_exercise_graph(), graph.as_slice());
    assert_eq!(db.get_email_index(), email_index.as_slice());
    assert_eq!(db.get_priority_queue(), queue.as_slice());
    for user in &users {
        assert_eq!(&db.get_user(&user.id).expect("user reloaded"), user);
    }

    let user = db.get_user_by_email("dana@example.com").expect("dana");
    assert_eq!(user.id, user_id);
    assert_eq!(user.experience_points, 1_200);
    assert_eq!(user.fitness_level, 4);
    assert_eq!(user.completed_exercises, vec!["EX100"]);
    assert_eq!(user.achievements, vec!["early_bird"]);
    assert_eq!(user.created_at, TEST_EPOCH);
    assert!(db.get_user_by_email("eli@example.com").is_ok());

    let workout = db.get_workout(&workout_id).expect("workout");
    assert_eq!(workout.user_id, user_id);
    assert_eq!(workout.end_time - workout.start_time, 600);

    // The pop order is persisted too
    let popped: Vec<String> = (0..queue.len())
        .map(|_| db.get_next_quest().expect("next quest").id)
        .collect();
    assert_eq!(popped, vec!["Q101", "Q100"]);
    assert!(db.get_priority_queue().is_empty());
}

#[test]
fn test_reopen_does_not_reseed_or_duplicate() {
    let env = TestEnv::new();
    {
        let mut db = env.open_seeded();
        db.create_user("finn", "finn@example.com", "pw")
            .expect("create user");
    }

    let stats_after_first_reopen = {
        let db = env.open_seeded();
        db.get_stats()
    };
    let db = env.open_seeded();

    assert_eq!(db.get_stats(), stats_after_first_reopen);
    assert_eq!(db.get_stats().btree.user_count, 2);
    assert_eq!(db.get_stats().other.graph_edges, 1);
    assert_eq!(db.get_stats().other.priority_queue_size, 1);
}
