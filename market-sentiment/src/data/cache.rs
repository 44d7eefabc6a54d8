//! Time-to-live cache for fetched market data.
//!
//! Entries are keyed by the set of tickers requested plus a parameter string
//! (history start, as-of date, ...). An entry older than the TTL is treated as
//! missing and refetched on the next request. The caller owns the cache and
//! passes it into each pipeline run.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds an entry stays fresh.
    pub ttl_seconds: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 7200 } // 2 hours
    }
}

/// Identity of a cached fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    tickers: Vec<String>,
    params: String,
}

impl CacheKey {
    /// Ticker order does not matter.
    pub fn new<S: AsRef<str>>(tickers: &[S], params: impl Into<String>) -> Self {
        let mut tickers: Vec<String> = tickers.iter().map(|t| t.as_ref().to_string()).collect();
        tickers.sort();
        tickers.dedup();
        Self {
            tickers,
            params: params.into(),
        }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn params(&self) -> &str {
        &self.params
    }
}

/// A cached payload and when it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub fetched_at: DateTime<Utc>,
}

/// TTL cache of market data payloads.
#[derive(Debug, Clone)]
pub struct MarketDataCache<T> {
    ttl: Duration,
    entries: HashMap<CacheKey, CacheEntry<T>>,
}

impl<T: Clone> MarketDataCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::seconds(config.ttl_seconds))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether an entry fetched at `fetched_at` is still usable at `now`.
    pub fn is_fresh(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - fetched_at < self.ttl
    }

    /// Fresh payload for `key`, if any.
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<&T> {
        self.entries
            .get(key)
            .filter(|entry| self.is_fresh(entry.fetched_at, now))
            .map(|entry| &entry.payload)
    }

    pub fn insert(&mut self, key: CacheKey, payload: T, now: DateTime<Utc>) {
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                fetched_at: now,
            },
        );
    }

    /// Return the fresh payload for `key`, or run `fetch` and store its result.
    ///
    /// A failed fetch leaves any stale entry in place.
    pub fn get_or_try_fetch<E>(
        &mut self,
        key: CacheKey,
        now: DateTime<Utc>,
        fetch: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        if let Some(payload) = self.get(&key, now) {
            debug!("Cache hit for {:?} ({})", key.tickers, key.params);
            return Ok(payload.clone());
        }

        debug!("Cache miss for {:?} ({})", key.tickers, key.params);
        let payload = fetch()?;
        self.insert(key, payload.clone(), now);
        Ok(payload)
    }

    /// Drop every entry that is no longer fresh. Returns how many were removed.
    pub fn evict_stale(&mut self, now: DateTime<Utc>) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| now - entry.fetched_at < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for MarketDataCache<T> {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
