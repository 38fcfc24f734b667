//! Test that prerequisites turn into graph edges that survive a restart.

use crate::e2e_tests::helpers::*;
use crate::types::GraphEdge;

#[test]
fn test_prerequisite_edge_after_restart() {
    let env = TestEnv::new();
    {
        let mut db = env.open();
        db.add_exercise(exercise("EX001", &[])).expect("add EX001");
        db.add_exercise(exercise("EX002", &["EX001"]))
            .expect("add EX002");
    }

    let db = env.open();

    assert_eq!(
        db.get_exercise_graph(),
        &[GraphEdge {
            from: "EX001".to_string(),
            to: "EX002".to_string(),
            weight: 1,
        }]
    );

    let exercises = db.get_all_exercises();
    assert_eq!(exercises.len(), 2);
    assert_eq!(exercises[0], exercise("EX001", &[]));
    assert_eq!(exercises[1], exercise("EX002", &["EX001"]));
}

#[test]
fn test_upserting_exercise_keeps_one_record() {
    let env = TestEnv::new();
    let mut db = env.open();

    db.add_exercise(exercise("EX300", &["EX001"]))
        .expect("first add");
    let mut changed = exercise("EX300", &["EX001"]);
    changed.calories_per_minute = 20;
    db.add_exercise(changed).expect("second add");

    assert_eq!(db.get_all_exercises().len(), 1);
    assert_eq!(
        db.get_exercise("EX300").expect("EX300").calories_per_minute,
        20
    );
    // Edges are appended per call
    assert_eq!(db.get_exercise_graph().len(), 2);
}

#[test]
fn test_many_exercises_stay_sorted() {
    let env = TestEnv::new();
    let mut db = env.open();

    // Enough inserts to split the exercise tree several times
    for i in (0..60).rev() {
        db.add_exercise(exercise(&format!("EX{i:03}"), &[]))
            .expect("add exercise");
    }

    let ids: Vec<String> = db.get_all_exercises().into_iter().map(|e| e.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids.len(), 60);
    assert_eq!(ids, sorted);
}
