//! Cache for optimized image variants.
//!
//! Variants are keyed by the image identifier plus the raw query string, so
//! two textually different query strings never share an entry even when they
//! request the same dimensions.
//!
//! # Store Contract
//!
//! The optimizer talks to the cache through [`CacheStore`]: opaque bytes in,
//! opaque bytes out, each entry with its own time-to-live. Concurrent writers
//! to the same key are allowed; the last write wins.
//!
//! # Default Store
//!
//! [`ImageCache`] is an in-process LRU bounded by total byte size and entry
//! count. Expired entries read as absent and are dropped on access.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::CacheError;

/// Default cache capacity: 256MB
pub const DEFAULT_CACHE_CAPACITY: usize = 256 * 1024 * 1024;

/// Default maximum number of entries (to bound LRU overhead)
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Default time-to-live for cached variants: 24 hours
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

// =============================================================================
// Cache Key
// =============================================================================

/// Cache key for an optimized variant: `"{image_id}?{query}"`.
///
/// The query string is used verbatim; parameter order and encoding matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Arc<str>);

impl CacheKey {
    /// Build the key for an image identifier and its raw query string.
    pub fn new(image_id: &str, query: &str) -> Self {
        Self(Arc::from(format!("{}?{}", image_id, query)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Store Trait
// =============================================================================

/// Cache occupancy snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Total bytes currently cached
    pub size: usize,

    /// Maximum total bytes
    pub capacity: usize,

    /// Number of cached entries
    pub entries: usize,
}

/// Key-value store for encoded image variants.
///
/// `get` is the authoritative hit check; `has` is a convenience check and
/// may race with expiry or a concurrent write.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Whether a live entry exists for `key`.
    async fn has(&self, key: &CacheKey) -> Result<bool, CacheError>;

    /// Fetch the entry for `key`, if present and not expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<Bytes>, CacheError>;

    /// Store `data` under `key` for `ttl`, replacing any existing entry.
    async fn add(&self, key: CacheKey, data: Bytes, ttl: Duration) -> Result<(), CacheError>;

    /// Current occupancy, if the store tracks it.
    async fn stats(&self) -> Option<CacheStats> {
        None
    }

    /// Drop every entry.
    async fn clear(&self) -> Result<(), CacheError>;
}

// =============================================================================
// Image Cache
// =============================================================================

struct CacheEntry {
    data: Bytes,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

struct CacheState {
    entries: LruCache<CacheKey, CacheEntry>,
    current_size: usize,
}

impl CacheState {
    fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.pop(key)?;
        self.current_size = self.current_size.saturating_sub(entry.data.len());
        Some(entry)
    }
}

/// LRU cache for encoded image variants with size-based capacity and
/// per-entry expiry.
///
/// # Thread Safety
///
/// The cache is thread-safe and can be shared across async tasks via `Arc`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use bytes::Bytes;
/// use fly_images::optimize::{CacheKey, CacheStore, ImageCache};
///
/// #[tokio::main]
/// async fn main() {
///     let cache = ImageCache::new();
///     let key = CacheKey::new("cat.jpg", "lg-w=200&lg-h=200");
///
///     cache
///         .add(key.clone(), Bytes::from_static(b"jpeg"), Duration::from_secs(60))
///         .await
///         .unwrap();
///
///     assert_eq!(cache.get(&key).await.unwrap(), Some(Bytes::from_static(b"jpeg")));
/// }
/// ```
pub struct ImageCache {
    state: RwLock<CacheState>,

    /// Maximum total size in bytes
    max_size: usize,
}

impl ImageCache {
    /// Create a new cache with default capacity (256MB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a new cache with the specified capacity in bytes.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    /// Create a new cache with specified capacity and maximum entries.
    ///
    /// A `max_entries` of zero is treated as one.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        let max_entries = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: RwLock::new(CacheState {
                entries: LruCache::new(max_entries),
                current_size: 0,
            }),
            max_size,
        }
    }

    /// Number of entries held, including expired ones not yet dropped.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Current total size of cached variants in bytes.
    pub async fn size(&self) -> usize {
        self.state.read().await.current_size
    }

    /// Maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }

}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for ImageCache {
    async fn has(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let state = self.state.read().await;
        let now = Instant::now();
        Ok(state
            .entries
            .peek(key)
            .is_some_and(|entry| !entry.is_expired(now)))
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<Bytes>, CacheError> {
        let mut state = self.state.write().await;
        let now = Instant::now();

        match state.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.data.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        state.remove(key);
        Ok(None)
    }

    async fn add(&self, key: CacheKey, data: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let data_size = data.len();
        let mut state = self.state.write().await;

        // If key exists, subtract old size first
        state.remove(&key);

        if data_size > self.max_size {
            return Ok(());
        }

        let entry = CacheEntry {
            data,
            expires_at: Instant::now() + ttl,
        };

        // Entry-count eviction happens inside the LRU
        if let Some((_, evicted)) = state.entries.push(key, entry) {
            state.current_size = state.current_size.saturating_sub(evicted.data.len());
        }
        state.current_size += data_size;

        while state.current_size > self.max_size {
            match state.entries.pop_lru() {
                Some((_, evicted)) => {
                    state.current_size = state.current_size.saturating_sub(evicted.data.len());
                }
                None => break,
            }
        }

        Ok(())
    }

    async fn stats(&self) -> Option<CacheStats> {
        let state = self.state.read().await;
        Some(CacheStats {
            size: state.current_size,
            capacity: self.max_size,
            entries: state.entries.len(),
        })
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.current_size = 0;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
