//! Collection counts.

use serde::{Deserialize, Serialize};

/// Number of keys in each tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeStats {
    pub exercise_count: usize,
    pub user_count: usize,
    pub workout_count: usize,
    pub quest_count: usize,
}

/// Number of entries in each auxiliary list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuxiliaryStats {
    pub email_index_size: usize,
    pub graph_edges: usize,
    pub priority_queue_size: usize,
}

/// Per-collection counts for the whole database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub btree: TreeStats,
    pub other: AuxiliaryStats,
}
