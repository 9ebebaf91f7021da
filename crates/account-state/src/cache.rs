use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

/// How often `set` sweeps out entries that expired without being read again.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Shared key/value cache consulted before probing the backend.
///
/// Implementations must tolerate concurrent `get`/`set` from many requests.
#[async_trait]
pub trait AccountCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn set(&self, key: &str, value: Value, ttl: Duration);
}

#[derive(Clone)]
struct CachedValue {
    value: Value,
    expires_at: Instant,
}

impl CachedValue {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-process cache with per-entry expiry.
///
/// Expired entries are dropped lazily on `get`, and in bulk by a sweep that
/// `set` runs at most once per sweep interval.
pub struct MemoryCache {
    entries: DashMap<String, CachedValue>,
    sweep_interval: Duration,
    last_sweep: Mutex<Instant>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            sweep_interval,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops expired entries and returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before.saturating_sub(self.entries.len())
    }

    fn sweep_if_due(&self) {
        let now = Instant::now();
        {
            let mut last = self.last_sweep.lock();
            if now.duration_since(*last) < self.sweep_interval {
                return;
            }
            *last = now;
        }
        let removed = self.prune_expired();
        if removed > 0 {
            debug!(
                removed,
                remaining = self.entries.len(),
                "swept expired cache entries"
            );
        }
    }
}

#[async_trait]
impl AccountCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.value().is_expired() {
                return Some(entry.value().value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| entry.is_expired());
        None
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.sweep_if_due();
        if ttl.is_zero() {
            self.entries.remove(key);
            return;
        }
        self.entries.insert(
            key.to_string(),
            CachedValue {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}
