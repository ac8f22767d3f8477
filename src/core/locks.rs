//! In-process lock table that serializes check-then-write sequences.
//!
//! Halls are locked exclusively by schedule and hall mutations and shared by
//! purchases. Movies are locked shared by schedule changes and exclusively by
//! movie deletion. Seats are locked per `(session, show date)` by purchases.
//! Locks are always acquired before a database transaction begins, in the
//! order halls, movies, seats.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// A set of async read/write locks addressed by key.
#[derive(Debug)]
pub struct KeyedLocks<K> {
    entries: Mutex<HashMap<K, Arc<RwLock<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    fn entry(&self, key: &K) -> Arc<RwLock<()>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        // entries nobody holds or waits on can go
        entries.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(entries.entry(key.clone()).or_default())
    }

    /// Waits for exclusive access to `key`.
    pub async fn exclusive(&self, key: K) -> OwnedRwLockWriteGuard<()> {
        self.entry(&key).write_owned().await
    }

    /// Waits for shared access to `key`.
    pub async fn shared(&self, key: K) -> OwnedRwLockReadGuard<()> {
        self.entry(&key).read_owned().await
    }

    /// Exclusive access to several keys, taken in ascending order so two callers
    /// locking overlapping sets cannot deadlock.
    pub async fn exclusive_all(&self, mut keys: Vec<K>) -> Vec<OwnedRwLockWriteGuard<()>>
    where
        K: Ord,
    {
        keys.sort();
        keys.dedup();
        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            guards.push(self.exclusive(key).await);
        }
        guards
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Every lock the core uses.
#[derive(Debug, Default)]
pub struct LockTable {
    /// Keyed by hall id
    pub halls: KeyedLocks<i64>,
    /// Keyed by movie id
    pub movies: KeyedLocks<i64>,
    /// Keyed by `(session id, show date)`
    pub seats: KeyedLocks<(i64, NaiveDate)>,
}
