// Life of a mutation:
// 1. Caller takes the database lock (SharedDatabase::lock)
// 2. The orchestrator updates one or more trees / auxiliary lists in memory
// 3. All seven collection files are rewritten, in a fixed order
// 4. The lock is released
//
// Reads only consult the in-memory trees and lists.
//
// System components:
//  - B-tree ordered map (storage::btree)
//  - Binary record codec (storage::codec)
//  - Collection files (storage::file)
//  - Orchestrator (storage::Database)

pub mod config;
pub mod storage;
pub mod types;

#[cfg(test)]
mod e2e_tests;

pub use config::{DatabaseConfig, FileFormat};
pub use storage::{Database, DatabaseError, SharedDatabase};
