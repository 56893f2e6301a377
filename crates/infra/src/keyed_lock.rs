//! In-process mutual exclusion keyed by value.
//!
//! `KeyedLock<K>` hands out one independent mutex per distinct key. Slots are
//! created lazily the first time a key is seen and are never removed, so the
//! table grows with the number of distinct keys observed. That is fine for
//! warehouse IDs, which form a small, bounded set.
//!
//! Release is tied to [`KeyedLockGuard`]: dropping the guard unlocks the key.
//! There is no way to unlock a key that was not locked.
//!
//! The lock is not reentrant. Locking a key that the current thread already
//! holds (without dropping the first guard) blocks forever.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};

type Slot = Arc<Mutex<()>>;

/// A table of mutexes, one per key.
#[derive(Debug)]
pub struct KeyedLock<K> {
    slots: Mutex<HashMap<K, Slot>>,
}

impl<K> Default for KeyedLock<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> KeyedLock<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the caller holds `key`.
    pub fn lock(&self, key: &K) -> KeyedLockGuard {
        KeyedLockGuard {
            _held: self.slot(key).lock_arc(),
        }
    }

    /// Take `key` only if nobody holds it right now.
    pub fn try_lock(&self, key: &K) -> Option<KeyedLockGuard> {
        self.slot(key)
            .try_lock_arc()
            .map(|held| KeyedLockGuard { _held: held })
    }

    /// Block for at most `timeout` waiting for `key`.
    ///
    /// A timeout too large to express as a deadline waits without bound.
    pub fn try_lock_for(&self, key: &K, timeout: Duration) -> Option<KeyedLockGuard> {
        self.slot(key)
            .try_lock_arc_for(timeout)
            .map(|held| KeyedLockGuard { _held: held })
    }

    /// Number of distinct keys observed so far.
    pub fn key_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Get-or-create the slot for `key`. The table lock is released before the
    /// caller starts waiting on the slot.
    fn slot(&self, key: &K) -> Slot {
        let mut slots = self.slots.lock();
        Arc::clone(slots.entry(key.clone()).or_default())
    }
}

/// Exclusive ownership of one key. Dropping it unlocks the key.
#[must_use = "the key is unlocked as soon as the guard is dropped"]
pub struct KeyedLockGuard {
    _held: ArcMutexGuard<RawMutex, ()>,
}

impl fmt::Debug for KeyedLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedLockGuard").finish_non_exhaustive()
    }
}
