//! End-to-end tests at the orchestrator level.
//!
//! Each test file covers one scenario, driving `Database` through its public
//! operations against a temporary directory and reopening it to check what
//! reached the disk.

#![cfg(test)]


mod test_clear_all_data;
mod test_corrupt_files;
mod test_email_uniqueness;
mod test_exercise_graph;
mod test_file_formats;
mod test_persistence_round_trip;
mod test_self_check;
