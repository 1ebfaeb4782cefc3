//! Image optimization layer.
//!
//! This module turns a stored source image into the variant a client asked
//! for, and caches every variant it produces.
//!
//! # Architecture
//!
//! The optimizer sits between the HTTP layer and storage:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             ImageOptimizer              │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  CacheStore  │  │   ImageCodec    │  │
//! │  │  (encoded    │  │  (decode →      │  │
//! │  │   variants)  │  │  crop/resize →  │  │
//! │  │              │  │   encode)       │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               ImageSource               │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`ImageOptimizer`]: Main entry point, runs the cache-or-transform flow
//! - [`CacheStore`]: Trait for the variant store
//! - [`ImageCache`]: In-process LRU store with TTL and size-based eviction
//! - [`CacheKey`]: `image_id?query`, used verbatim
//! - [`ImageCodec`]: Decode, center crop, bounded resize, encode
//! - [`OptimizedImage`]: Bytes plus content type and request metadata

mod cache;
mod codec;
mod service;

pub use cache::{
    CacheKey, CacheStats, CacheStore, ImageCache, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL,
    DEFAULT_MAX_ENTRIES,
};
pub use codec::{
    clamp_quality, content_type, is_valid_quality, DecodedImage, EncodedImage, ImageCodec,
    DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use service::{ImageOptimizer, OptimizedImage, DEFAULT_MAX_DIMENSION};
