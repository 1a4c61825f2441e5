//! Explicit request cache.
//!
//! Entries are keyed by the request line and grouped into scopes so mutations
//! can invalidate everything they affect in one call.
//!
//! # Contract
//!
//! - An entry is served while `now - stored_at < ttl`; expired entries are
//!   never served and are dropped when looked up, or by the next store
//! - Creating a session, starting preprocessing or classifying invalidates
//!   [`CacheScope::Sessions`]
//! - Logging in replaces the [`CacheScope::User`] entry
//! - Logging out, or any 401, clears every entry

use std::{collections::HashMap, ops::Sub, time::Duration};

use serde_json::Value;

/// Group of entries invalidated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    /// The current user.
    User,
    /// Session listings, details and searches.
    Sessions,
}

/// Cache key: scope plus request signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Invalidation group.
    pub scope: CacheScope,
    /// Request line, e.g. `GET /sessions?page=0&size=10`.
    pub signature: String,
}

impl CacheKey {
    /// Key for `signature` in `scope`.
    pub fn new(scope: CacheScope, signature: impl Into<String>) -> Self {
        Self { scope, signature: signature.into() }
    }
}

#[derive(Debug, Clone)]
struct Entry<I> {
    value: Value,
    stored_at: I,
}

/// TTL cache of decoded response payloads.
///
/// Generic over the instant type so simulations can drive expiry with a
/// virtual clock.
#[derive(Debug, Clone)]
pub struct QueryCache<I> {
    ttl: Duration,
    entries: HashMap<CacheKey, Entry<I>>,
}

impl<I> QueryCache<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    /// Fresh payload for `key`, if any.
    pub fn get(&mut self, key: &CacheKey, now: I) -> Option<&Value> {
        let fresh = now - self.entries.get(key)?.stored_at < self.ttl;
        if !fresh {
            tracing::trace!(signature = %key.signature, "cache entry expired");
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: CacheKey, value: Value, now: I) {
        self.entries.insert(key, Entry { value, stored_at: now });
    }

    /// Drop `key`. Returns true if it was present.
    pub fn remove(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry in `scope`. Returns the number dropped.
    pub fn invalidate(&mut self, scope: CacheScope) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.scope != scope);
        let dropped = before - self.entries.len();
        tracing::debug!(?scope, dropped, "cache scope invalidated");
        dropped
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop expired entries. Returns the number dropped.
    pub fn evict_expired(&mut self, now: I) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| now - entry.stored_at < ttl);
        before - self.entries.len()
    }

    /// Stored keys, fresh or not, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.keys()
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
