// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-zone mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-zone locks keyed by zone id.
///
/// A lock is created the first time a zone id is seen and is kept for the life of
/// the process, so the map grows with the number of distinct zones touched.
/// Holding the returned guard serializes every synchronization step for that zone;
/// dropping it (on success or error) releases the zone.
#[derive(Debug, Default)]
pub struct ZoneLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ZoneLocks {
    /// Create an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, zone_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(zone_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Wait for exclusive access to `zone_id`.
    pub async fn acquire(&self, zone_id: &str) -> OwnedMutexGuard<()> {
        self.lock_for(zone_id).lock_owned().await
    }

    /// Try to take the lock for `zone_id` without waiting.
    #[must_use]
    pub fn try_acquire(&self, zone_id: &str) -> Option<OwnedMutexGuard<()>> {
        self.lock_for(zone_id).try_lock_owned().ok()
    }

    /// Number of zones that have a lock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true when no zone has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod locks_tests;
