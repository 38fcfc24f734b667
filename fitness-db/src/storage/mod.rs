//! Fitness data storage engine.
//!
//! An in-memory engine persisted as seven flat files in one directory:
//!
//! - `exercises.dat`, `users.dat`, `workouts.dat`, `quests.dat`: one B-tree
//!   each, stored as `<count>` followed by `<key><record>` pairs
//! - `email_index.dat`, `graph.dat`, `priority_queue.dat`: flat lists,
//!   stored as `<count>` followed by the entries
//!
//! All seven files are rewritten after every mutation.
//!
//! # Usage
//!
//! ```no_run
//! use fitness_db::config::DatabaseConfig;
//! use fitness_db::storage::Database;
//!
//! let mut db = Database::open(DatabaseConfig::new("./fitness_data"))?;
//! let id = db.create_user("alice", "alice@example.com", "secret")?;
//! assert_eq!(db.get_user_by_email("alice@example.com")?.id, id);
//! db.close()?;
//! # Ok::<(), fitness_db::storage::DatabaseError>(())
//! ```

pub mod btree;
pub mod codec;
mod database;
pub mod file;
mod shared;
mod time;

pub use database::{Database, DatabaseError};
pub use file::FileError;
pub use shared::{DatabaseGuard, SharedDatabase};
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
