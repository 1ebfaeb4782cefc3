//! Image optimizer orchestrating the per-request flow.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         ImageOptimizer                           │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                       optimize()                           │  │
//! │  │  1. Cache key          5. Cache lookup (hit → 8)           │  │
//! │  │  2. Resolve tier       6. Read source                      │  │
//! │  │  3. Parse query        7. Transform & cache                │  │
//! │  │  4. Resolve dims       8. Return bytes + content type      │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! │        │                     │                     │             │
//! │        ▼                     ▼                     ▼             │
//! │  ┌────────────┐      ┌──────────────┐     ┌────────────────┐     │
//! │  │ CacheStore │      │ ImageSource  │     │  ImageCodec    │     │
//! │  └────────────┘      └──────────────┘     └────────────────┘     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The optimizer holds only shared collaborators. Everything derived from a
//! request (tier, dimensions, decoded image) lives on the stack of a single
//! `optimize` call.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use image::ImageFormat;
use tracing::{debug, warn};

use crate::breakpoint::{
    resolve_dimensions, resolve_tier, DimensionRequest, ResolvedDimensions, Tier, Transform,
};
use crate::error::OptimizeError;
use crate::storage::ImageSource;

use super::cache::{CacheKey, CacheStats, CacheStore, DEFAULT_CACHE_TTL};
use super::codec::{EncodedImage, ImageCodec};

/// Default upper bound on a requested crop or resize side, in pixels.
pub const DEFAULT_MAX_DIMENSION: u32 = 4096;

// =============================================================================
// Optimized Image
// =============================================================================

/// Result of a single `optimize` call.
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    /// Encoded image bytes
    pub data: Bytes,

    /// MIME type of `data`, e.g. `image/jpeg`
    pub content_type: &'static str,

    /// Detected format of `data`
    pub format: ImageFormat,

    /// Width of the served image in pixels
    pub width: u32,

    /// Height of the served image in pixels
    pub height: u32,

    /// Tier resolved from the viewport signal
    pub tier: Tier,

    /// Dimensions resolved for `tier`
    pub dimensions: ResolvedDimensions,

    /// Whether the bytes came from the cache
    pub cache_hit: bool,
}

impl OptimizedImage {
    fn from_encoded(
        image: EncodedImage,
        tier: Tier,
        dimensions: ResolvedDimensions,
        cache_hit: bool,
    ) -> Self {
        Self {
            content_type: image.content_type(),
            data: image.data,
            format: image.format,
            width: image.width,
            height: image.height,
            tier,
            dimensions,
            cache_hit,
        }
    }

    /// The transform selected for this request.
    pub fn transform(&self) -> Transform {
        self.dimensions.transform()
    }
}

// =============================================================================
// Image Optimizer
// =============================================================================

/// Serves responsively-sized variants of stored images.
///
/// # Type Parameters
///
/// * `S` - The image source (e.g. a folder on disk)
///
/// # Example
///
/// ```ignore
/// use fly_images::optimize::{ImageCache, ImageOptimizer};
/// use fly_images::storage::FsImageSource;
///
/// let optimizer = ImageOptimizer::new(FsImageSource::new("/srv/images"), ImageCache::new());
///
/// let image = optimizer
///     .optimize("cat.jpg", "lg-w=200&lg-h=200", Some("1300"))
///     .await?;
///
/// println!("{} bytes of {}, cache hit: {}", image.data.len(), image.content_type, image.cache_hit);
/// ```
pub struct ImageOptimizer<S: ImageSource> {
    /// Where source images are read from
    source: Arc<S>,

    /// Store for encoded variants
    cache: Arc<dyn CacheStore>,

    /// Decoder, transformer and encoder
    codec: ImageCodec,

    /// Time-to-live for new cache entries
    ttl: Duration,

    /// Largest crop or resize side a request may ask for
    max_dimension: u32,
}

impl<S: ImageSource> ImageOptimizer<S> {
    /// Create an optimizer with the default codec and TTL.
    pub fn new(source: S, cache: impl CacheStore) -> Self {
        Self::with_shared_cache(Arc::new(source), Arc::new(cache))
    }

    /// Create an optimizer over shared collaborators.
    pub fn with_shared_cache(source: Arc<S>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            source,
            cache,
            codec: ImageCodec::new(),
            ttl: DEFAULT_CACHE_TTL,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }

    /// Use `codec` for decoding and encoding.
    pub fn with_codec(mut self, codec: ImageCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Store new variants for `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Reject crop and resize requests with a side larger than `max_dimension`.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Produce the variant of `image_id` requested by `query` for the viewport.
    ///
    /// `query` is the raw, undecoded query string; it is used verbatim in the
    /// cache key. `viewport` is the raw viewport-size hint, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a crop or resize side exceeds the maximum (`DimensionTooLarge`)
    /// - `image_id` has no backing file (`SourceNotFound`)
    /// - the cached or stored bytes are not a valid image (`DecodeFailure`)
    /// - the transformed image cannot be encoded (`EncodeFailure`)
    ///
    /// Cache failures never fail the request.
    pub async fn optimize(
        &self,
        image_id: &str,
        query: &str,
        viewport: Option<&str>,
    ) -> Result<OptimizedImage, OptimizeError> {
        let cache_key = CacheKey::new(image_id, query);
        let tier = resolve_tier(viewport);
        let params = DimensionRequest::parse(query);
        let dimensions = resolve_dimensions(tier, &params);
        let transform = dimensions.transform();

        if let Some(side) = transform.max_side() {
            if side > self.max_dimension {
                return Err(OptimizeError::DimensionTooLarge {
                    requested: side,
                    max: self.max_dimension,
                });
            }
        }

        if let Some(blob) = self.lookup(&cache_key).await {
            // Cached blobs are served as stored; a corrupt entry fails the request.
            let image = self.run_codec(move |codec| codec.inspect(blob)).await?;
            debug!(key = %cache_key, tier = %tier, "Cache hit");
            return Ok(OptimizedImage::from_encoded(image, tier, dimensions, true));
        }

        let source = self
            .source
            .read(image_id)
            .await
            .map_err(|e| OptimizeError::from_io(image_id, e))?;

        let image = self
            .run_codec(move |codec| codec.apply(source, transform))
            .await?;

        debug!(
            key = %cache_key,
            tier = %tier,
            transform = transform.name(),
            width = image.width,
            height = image.height,
            "Generated variant"
        );

        self.store(cache_key, image.data.clone()).await;

        Ok(OptimizedImage::from_encoded(image, tier, dimensions, false))
    }

    /// Read from the cache, treating store errors as a miss.
    async fn lookup(&self, key: &CacheKey) -> Option<Bytes> {
        match self.cache.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Write to the cache, logging and ignoring store errors.
    async fn store(&self, key: CacheKey, data: Bytes) {
        if let Err(e) = self.cache.add(key.clone(), data, self.ttl).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }

    /// Run CPU-bound codec work off the async runtime.
    async fn run_codec<F>(&self, work: F) -> Result<EncodedImage, OptimizeError>
    where
        F: FnOnce(&ImageCodec) -> Result<EncodedImage, OptimizeError> + Send + 'static,
    {
        let codec = self.codec;
        tokio::task::spawn_blocking(move || work(&codec))
            .await
            .map_err(|e| OptimizeError::Task(e.to_string()))?
    }

    /// Get cache statistics, if the store tracks them.
    pub async fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.stats().await
    }

    /// Drop every cached variant.
    pub async fn clear_cache(&self) {
        if let Err(e) = self.cache.clear().await {
            warn!(error = %e, "Cache clear failed");
        }
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Time-to-live applied to new cache entries.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }
}

// =============================================================================
// Tests
// =============================================================================
