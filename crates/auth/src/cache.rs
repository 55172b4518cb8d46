//! Transient keyed state with TTLs.
//!
//! Everything stateful at the trust boundary (revoked sessions, one-shot
//! codes) rides on this port. Implementations must make [`TtlCache::take`]
//! atomic: a stored value is observed by at most one caller.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;

/// Key prefix isolating one purpose's entries from every other purpose.
///
/// Two entries under the same key but different namespaces never collide,
/// the same way a per-purpose cache database split would keep them apart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(&'static str);

impl Namespace {
    pub const fn new(prefix: &'static str) -> Self {
        Self(prefix)
    }

    pub fn prefix(&self) -> &'static str {
        self.0
    }
}

impl core::fmt::Display for Namespace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache operation timed out")]
    Timeout,
}

/// Namespaced TTL key/value port.
#[async_trait]
pub trait TtlCache: Send + Sync {
    /// Store `value` under `(ns, key)` for `ttl`, replacing any previous
    /// entry.
    async fn put(
        &self,
        ns: Namespace,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Non-destructive read. Expired entries read as absent.
    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>, CacheError>;

    /// Atomic read-and-remove. At most one caller ever sees a given value.
    async fn take(&self, ns: Namespace, key: &str) -> Result<Option<String>, CacheError>;

    /// Remove an entry. Removing an absent entry is not an error.
    async fn delete(&self, ns: Namespace, key: &str) -> Result<(), CacheError>;
}

/// In-memory [`TtlCache`] for tests and single-process deployments.
///
/// Expiry is lazy: stale entries are dropped when a read finds them, never
/// by a background sweep.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<(Namespace, String), StoredValue>>,
}

#[derive(Debug)]
struct StoredValue {
    value: String,
    expires_at: Instant,
}

impl StoredValue {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> CacheError {
        CacheError::Unavailable("cache lock poisoned".to_string())
    }
}

#[async_trait]
impl TtlCache for MemoryCache {
    async fn put(
        &self,
        ns: Namespace,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(
            (ns, key.to_string()),
            StoredValue {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        // Write lock so a stale entry can be dropped on the spot.
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        let full_key = (ns, key.to_string());
        if let Some(stored) = entries.get(&full_key) {
            if stored.is_expired(now) {
                entries.remove(&full_key);
                return Ok(None);
            }
            return Ok(Some(stored.value.clone()));
        }
        Ok(None)
    }

    async fn take(&self, ns: Namespace, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        match entries.remove(&(ns, key.to_string())) {
            Some(stored) if stored.is_expired(now) => Ok(None),
            Some(stored) => Ok(Some(stored.value)),
            None => Ok(None),
        }
    }

    async fn delete(&self, ns: Namespace, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.remove(&(ns, key.to_string()));
        Ok(())
    }
}
