//! Coarse-grained shared access to one database.
//!
//! `Database` holds no locks of its own. `SharedDatabase` puts it behind a
//! single mutex, and every operation goes through a `DatabaseGuard` that
//! keeps the lock for as long as it lives, including the synchronous file
//! rewrite of a mutating call. A slow disk therefore serializes all callers.
//!
//! # Connection state
//!
//! The handle starts connected. `disconnect` saves and releases the engine;
//! afterwards `lock` fails with `NotConnected` until `reconnect` reopens it
//! from the same configuration.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::DatabaseConfig;
use crate::storage::database::{Database, DatabaseError};

/// A cloneable handle to one database shared between threads.
#[derive(Debug, Clone)]
pub struct SharedDatabase {
    inner: Arc<Mutex<Option<Database>>>,
    config: DatabaseConfig,
}

impl SharedDatabase {
    /// Open the database described by `config` and share it.
    pub fn connect(config: DatabaseConfig) -> Result<Self, DatabaseError> {
        let database = Database::open(config.clone())?;
        Ok(Self::new(database, config))
    }

    /// Share an already opened database.
    ///
    /// `config` is used by `reconnect`.
    #[must_use]
    pub fn new(database: Database, config: DatabaseConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(database))),
            config,
        }
    }

    /// Acquire exclusive access for one or more operations.
    pub fn lock(&self) -> Result<DatabaseGuard<'_>, DatabaseError> {
        let guard = self.inner.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        if guard.is_none() {
            return Err(DatabaseError::NotConnected);
        }
        Ok(DatabaseGuard { guard })
    }

    /// Save and release the database.
    ///
    /// The lock is held across the save. If the save fails the database stays
    /// connected with its in-memory state intact, so the caller can retry.
    /// Disconnecting twice is a no-op.
    pub fn disconnect(&self) -> Result<(), DatabaseError> {
        let mut guard = self.inner.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        let Some(database) = guard.as_ref() else {
            return Ok(());
        };

        database.save_all_data()?;
        if let Some(database) = guard.take() {
            database.release();
        }

        tracing::info!(
            "Disconnected database at {}",
            self.config.data_directory.display()
        );
        Ok(())
    }

    /// Reopen a disconnected database from disk.
    ///
    /// Does nothing if still connected.
    pub fn reconnect(&self) -> Result<(), DatabaseError> {
        let mut guard = self.inner.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        if guard.is_none() {
            *guard = Some(Database::open(self.config.clone())?);
        }
        Ok(())
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.lock().is_ok_and(|guard| guard.is_some())
    }

    /// Check that the lock can be taken and the data directory is still
    /// there.
    #[must_use]
    pub fn health_check(&self) -> bool {
        self.lock()
            .is_ok_and(|database| database.data_directory().is_dir())
    }
}

/// Exclusive access to a connected database.
///
/// Derefs to `Database`. The lock is released when the guard is dropped.
pub struct DatabaseGuard<'a> {
    guard: MutexGuard<'a, Option<Database>>,
}

impl Deref for DatabaseGuard<'_> {
    type Target = Database;

    fn deref(&self) -> &Database {
        match self.guard.as_ref() {
            Some(database) => database,
            None => unreachable!("guards are only handed out while connected"),
        }
    }
}

impl DerefMut for DatabaseGuard<'_> {
    fn deref_mut(&mut self) -> &mut Database {
        match self.guard.as_mut() {
            Some(database) => database,
            None => unreachable!("guards are only handed out while connected"),
        }
    }
}
