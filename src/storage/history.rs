//! Bounded in-memory history of analysis results
//!
//! Shared between the ingestion path (one writer per connection) and the
//! presentation path (snapshot readers). A single `RwLock` serializes writers
//! against each other and against snapshot copies, so a snapshot never sees a
//! half-appended entry. Readers hold the lock only for the copy.

use std::collections::VecDeque;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use super::StorageError;
use crate::types::HistoryEntry;

struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
    total_appended: u64,
    total_evicted: u64,
}

/// Fixed-capacity FIFO store of [`HistoryEntry`] values.
pub struct HistoryStore {
    capacity: usize,
    inner: RwLock<HistoryBuffer>,
}

/// Counters for the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub len: usize,
    pub capacity: usize,
    pub total_appended: u64,
    pub total_evicted: u64,
}

impl HistoryStore {
    /// Create an empty store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self, StorageError> {
        if capacity == 0 {
            return Err(StorageError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            inner: RwLock::new(HistoryBuffer {
                entries: VecDeque::with_capacity(capacity),
                total_appended: 0,
                total_evicted: 0,
            }),
        })
    }

    /// Append an entry, evicting the oldest one when full.
    ///
    /// Returns the evicted entry, if any.
    pub fn append(&self, entry: HistoryEntry) -> Option<HistoryEntry> {
        let mut buffer = self.write();
        let evicted = if buffer.entries.len() >= self.capacity {
            buffer.total_evicted += 1;
            buffer.entries.pop_front()
        } else {
            None
        };
        buffer.entries.push_back(entry);
        buffer.total_appended += 1;
        evicted
    }

    /// Point-in-time copy of the current entries, oldest first.
    pub fn snapshot(&self) -> HistorySnapshot {
        let entries: Vec<HistoryEntry> = {
            let buffer = self.read();
            buffer.entries.iter().copied().collect()
        };
        HistorySnapshot {
            entries,
            capacity: self.capacity,
            taken_at: Utc::now(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    pub fn stats(&self) -> HistoryStats {
        let buffer = self.read();
        HistoryStats {
            len: buffer.entries.len(),
            capacity: self.capacity,
            total_appended: buffer.total_appended,
            total_evicted: buffer.total_evicted,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HistoryBuffer> {
        self.inner.read().unwrap_or_else(|e| {
            warn!("History RwLock poisoned on read, recovering");
            e.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HistoryBuffer> {
        self.inner.write().unwrap_or_else(|e| {
            warn!("History RwLock poisoned on write, recovering");
            e.into_inner()
        })
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Immutable copy of the history at one instant.
///
/// Owns its entries; holding one never blocks writers.
#[derive(Debug, Clone, Serialize)]
pub struct HistorySnapshot {
    entries: Vec<HistoryEntry>,
    capacity: usize,
    taken_at: DateTime<Utc>,
}

impl HistorySnapshot {
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}

impl<'a> IntoIterator for &'a HistorySnapshot {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
