//! B-tree implementation for the storage engine.
//!
//! This module provides the in-memory ordered map behind every collection.
//!
//! # Structure
//!
//! - Nodes hold between `MIN_KEYS` and `MAX_KEYS` entries (the root may hold
//!   fewer), internal nodes own one more child than they have entries.
//! - Inserts are upserts; keys are never duplicated.
//! - There is no delete.
//!
//! # Usage
//!
//! ```
//! use fitness_db::storage::btree::BTree;
//!
//! let mut tree = BTree::new();
//! tree.insert("EX002".to_string(), "Squat");
//! tree.insert("EX001".to_string(), "Push-up");
//!
//! assert_eq!(tree.get(&"EX001".to_string()), Some(&"Push-up"));
//! assert_eq!(tree.get_all_keys(), vec!["EX001", "EX002"]);
//! ```

mod node;
mod tree;

pub use node::{Entry, MAX_KEYS, MIN_KEYS, Node, ORDER};
pub use tree::{BTree, BTreeError, Iter};
