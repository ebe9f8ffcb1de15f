//! Result Cache
//!
//! Content-addressed memoization of expensive remote results. A fingerprint
//! maps to either a pending production or a ready value. The check-and-set
//! into the pending state happens under one mutex, so for a given key at most
//! one producer runs at a time; concurrent callers subscribe to the
//! in-flight result instead of starting their own.
//!
//! Failures are never cached: the pending marker is removed and the next
//! caller produces again.

pub mod key;

pub use key::{analysis_key, rewrite_key};

use crate::types::Fingerprint;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::debug;

/// Lifecycle state of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Pending,
    Ready,
}

/// Counters since the cache was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a ready entry
    pub hits: u64,
    /// Lookups that started a production
    pub misses: u64,
    /// Lookups that joined an in-flight production
    pub waits: u64,
    /// Productions that failed
    pub failures: u64,
}

enum Slot<V> {
    Pending {
        episode: u64,
        receiver: watch::Receiver<Option<V>>,
    },
    Ready(V),
}

enum Claim<V> {
    Ready(V),
    Wait(watch::Receiver<Option<V>>),
    Produce {
        episode: u64,
        sender: watch::Sender<Option<V>>,
    },
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    waits: AtomicU64,
    failures: AtomicU64,
}

/// Fingerprint-keyed store with at most one in-flight producer per key
pub struct ResultCache<V> {
    name: &'static str,
    slots: Mutex<HashMap<Fingerprint, Slot<V>>>,
    next_episode: AtomicU64,
    counters: Counters,
}

/// Removes the pending marker unless the production completed.
///
/// Covers both a failed `produce` and a producer future dropped mid-flight;
/// either way waiters see the sender close and retry.
struct PendingGuard<'a, V> {
    cache: &'a ResultCache<V>,
    key: &'a str,
    episode: u64,
    armed: bool,
}

impl<V> Drop for PendingGuard<'_, V> {
    fn drop(&mut self) {
        if self.armed {
            self.cache.remove_pending(self.key, self.episode);
        }
    }
}

impl<V: Clone> ResultCache<V> {
    /// Create an empty cache. `name` only labels log events.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: Mutex::new(HashMap::new()),
            next_episode: AtomicU64::new(0),
            counters: Counters::default(),
        }
    }

    /// Return the value for `key`, producing it if no entry exists.
    ///
    /// `produce` is invoked at most once per call, and never while another
    /// production for the same key is pending or after it became ready. If a
    /// production this call was waiting on fails, the call retries and may
    /// become the producer itself. A failing `produce` returns its error to
    /// this caller only.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, produce: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let (episode, sender) = loop {
            match self.claim(key) {
                Claim::Ready(value) => return Ok(value),
                Claim::Wait(receiver) => {
                    if let Some(value) = Self::wait(receiver).await {
                        return Ok(value);
                    }
                    debug!(cache = self.name, key, "In-flight production failed, retrying");
                }
                Claim::Produce { episode, sender } => break (episode, sender),
            }
        };

        let mut guard = PendingGuard {
            cache: self,
            key,
            episode,
            armed: true,
        };

        match produce().await {
            Ok(value) => {
                sender.send_replace(Some(value.clone()));
                self.fulfil(key, episode, value.clone());
                guard.armed = false;
                Ok(value)
            }
            Err(err) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                debug!(cache = self.name, key, "Production failed, clearing pending marker");
                drop(guard);
                Err(err)
            }
        }
    }

    /// Ready value for `key`, if any. Never waits on a pending entry.
    pub fn get(&self, key: &str) -> Option<V> {
        match self.slots.lock().get(key) {
            Some(Slot::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn state(&self, key: &str) -> Option<EntryState> {
        self.slots.lock().get(key).map(|slot| match slot {
            Slot::Pending { .. } => EntryState::Pending,
            Slot::Ready(_) => EntryState::Ready,
        })
    }

    /// Drop the entry for `key`. A production still in flight for it
    /// returns its value to its callers but does not store it.
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.slots.lock().remove(key).is_some();
        if removed {
            debug!(cache = self.name, key, "Invalidated cache entry");
        }
        removed
    }

    pub fn clear(&self) {
        let mut slots = self.slots.lock();
        debug!(cache = self.name, entries = slots.len(), "Clearing cache");
        slots.clear();
    }

    /// Number of entries, pending and ready
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            waits: self.counters.waits.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    fn claim(&self, key: &str) -> Claim<V> {
        let mut slots = self.slots.lock();
        match slots.get(key) {
            Some(Slot::Ready(value)) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(cache = self.name, key, "Cache hit");
                Claim::Ready(value.clone())
            }
            Some(Slot::Pending { receiver, .. }) => {
                self.counters.waits.fetch_add(1, Ordering::Relaxed);
                debug!(cache = self.name, key, "Joining in-flight production");
                Claim::Wait(receiver.clone())
            }
            None => {
                let episode = self.next_episode.fetch_add(1, Ordering::Relaxed);
                let (sender, receiver) = watch::channel(None);
                slots.insert(key.to_string(), Slot::Pending { episode, receiver });
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!(cache = self.name, key, "Cache miss");
                Claim::Produce { episode, sender }
            }
        }
    }

    /// Resolves to the produced value, or `None` once the producer is gone
    /// without one.
    async fn wait(mut receiver: watch::Receiver<Option<V>>) -> Option<V> {
        loop {
            let current = (*receiver.borrow_and_update()).clone();
            if current.is_some() {
                return current;
            }
            if receiver.changed().await.is_err() {
                return (*receiver.borrow()).clone();
            }
        }
    }

    fn fulfil(&self, key: &str, episode: u64, value: V) {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get_mut(key) {
            if matches!(slot, Slot::Pending { episode: current, .. } if *current == episode) {
                *slot = Slot::Ready(value);
            }
        }
    }
}

impl<V> ResultCache<V> {
    fn remove_pending(&self, key: &str, episode: u64) {
        let mut slots = self.slots.lock();
        if matches!(slots.get(key), Some(Slot::Pending { episode: current, .. }) if *current == episode)
        {
            slots.remove(key);
        }
    }
}
