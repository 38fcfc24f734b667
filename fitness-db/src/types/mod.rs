//! Domain records stored by the database.
//!
//! All records are plain values with a fixed binary layout (see
//! `storage::codec::Record`) and serde derives for the application layer.

mod auxiliary;
mod exercise;
mod quest;
mod stats;
mod user;
mod workout;

pub use auxiliary::{EmailIndexEntry, GraphEdge, PriorityEntry};
pub use exercise::{Exercise, ExerciseDifficulty, ExerciseType};
pub use quest::Quest;
pub use stats::{AuxiliaryStats, DatabaseStats, TreeStats};
pub use user::User;
pub use workout::WorkoutSession;
