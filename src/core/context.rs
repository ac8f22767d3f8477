//! Shared handles every core operation needs.

use crate::clock::{Clock, SystemClock};
use crate::core::locks::LockTable;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Database connection, time source and lock table.
///
/// Cloning is cheap; clones share the same lock table.
#[derive(Debug, Clone)]
pub struct CoreContext {
    /// Database connection for all store access
    pub db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    locks: Arc<LockTable>,
}

impl CoreContext {
    /// Creates a context with an explicit clock.
    #[must_use]
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            locks: Arc::new(LockTable::default()),
        }
    }

    /// Creates a context that reads the host clock.
    #[must_use]
    pub fn with_system_clock(db: DatabaseConnection) -> Self {
        Self::new(db, Arc::new(SystemClock))
    }

    /// The time source.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn locks(&self) -> &LockTable {
        &self.locks
    }
}
