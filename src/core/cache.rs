// src/core/cache.rs

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Bookkeeping guarded by the cache's single mutex.
struct CacheState<K, V> {
    /// Keys whose computation finished successfully.
    ready: HashMap<K, V>,
    /// Keys currently being computed, each with the condvar its followers wait on.
    pending: HashMap<K, Arc<Condvar>>,
}

/// A compute-once cache that coalesces concurrent requests for the same key.
///
/// The first caller for a missing key becomes the leader and runs the
/// computation outside the lock; every other caller for that key waits until
/// the leader publishes a value or gives up. Failures are never cached: when
/// the leader fails, the key returns to the absent state and one of the
/// woken followers becomes the next leader.
///
/// Entries are never evicted and there is no timeout on followers, so this is
/// only suitable for a small, fixed set of values that do not change during the
/// life of the process.
pub struct SingleFlightCache<K, V> {
    state: Mutex<CacheState<K, V>>,
}

impl<K, V> fmt::Debug for SingleFlightCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlightCache").finish_non_exhaustive()
    }
}

impl<K, V> Default for SingleFlightCache<K, V> {
    fn default() -> Self {
        Self {
            state: Mutex::new(CacheState {
                ready: HashMap::new(),
                pending: HashMap::new(),
            }),
        }
    }
}

impl<K, V> SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, computing it with `compute` if it
    /// is absent.
    ///
    /// At most one computation per key runs at any time. An error returned by
    /// `compute` is propagated only to the caller that ran it; waiting callers
    /// retry instead. A panic inside `compute` is treated like an error for the
    /// waiters and then resumes unwinding in the leader.
    pub fn get_or_compute<E, F>(&self, key: &K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let signal = {
            let mut state = self.lock();
            loop {
                if let Some(value) = state.ready.get(key) {
                    return Ok(value.clone());
                }
                // Re-checked on every wakeup: the leader may have failed.
                match state.pending.get(key).cloned() {
                    Some(signal) => {
                        state = signal
                            .wait(state)
                            .unwrap_or_else(PoisonError::into_inner);
                    }
                    None => break,
                }
            }

            let signal = Arc::new(Condvar::new());
            state.pending.insert(key.clone(), Arc::clone(&signal));
            signal
        };

        // Clears the pending marker if `compute` fails or panics.
        let abandon = scopeguard::guard((), |()| {
            let mut state = self.lock();
            state.pending.remove(key);
            signal.notify_all();
        });

        let value = compute()?;
        scopeguard::ScopeGuard::into_inner(abandon);

        let mut state = self.lock();
        state.pending.remove(key);
        state.ready.insert(key.clone(), value.clone());
        signal.notify_all();
        Ok(value)
    }

    /// Returns the cached value for `key` without computing or waiting.
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().ready.get(key).cloned()
    }

    /// Number of keys with a published value.
    pub fn len(&self) -> usize {
        self.lock().ready.len()
    }

    /// Returns `true` if no value has been published yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        // No invariant spans a panic point while the lock is held.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
