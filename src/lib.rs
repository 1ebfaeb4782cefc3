//! # fly-images
//!
//! A responsive image server.
//!
//! Given a source image and a query string of per-breakpoint dimensions, this
//! library picks a breakpoint tier from the client's viewport width and serves
//! a center-cropped square, an aspect-preserving resize, or the untouched
//! source. Each variant is computed on first request and served from cache
//! afterwards.
//!
//! ## Request Format
//!
//! ```text
//! GET /images/photo.jpg?lg-w=800&lg-h=400&sm-w=300&sm-h=300
//! Cookie: resolution=1280
//! ```
//!
//! - Tiers: `lg` (≥1200px), `md` (≥992px), `sm` (≥768px), `xs` (smaller or unknown)
//! - Keys: `<tier>-w` and `<tier>-h`, in pixels
//! - A tier without a value inherits the nearest larger tier's value
//! - Equal width and height crop a square; unequal ones fit inside the box
//!
//! ## Architecture
//!
//! - [`breakpoint`] - Tier resolution and dimension fallback
//! - [`optimize`] - Cache-or-transform pipeline, variant cache and codec
//! - [`storage`] - Source image access
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use fly_images::{create_router, FsImageSource, ImageCache, ImageOptimizer, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = FsImageSource::new("/srv/images");
//!     let optimizer = ImageOptimizer::new(source, ImageCache::new());
//!     let router = create_router(optimizer, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod breakpoint;
pub mod config;
pub mod error;
pub mod optimize;
pub mod server;
pub mod storage;

// Re-export commonly used types
pub use breakpoint::{
    resolve_dimension, resolve_dimensions, resolve_tier, Axis, DimensionRequest,
    ResolvedDimensions, Tier, Transform,
};
pub use config::Config;
pub use error::{CacheError, IoError, OptimizeError};
pub use optimize::{
    CacheKey, CacheStats, CacheStore, ImageCache, ImageCodec, ImageOptimizer, OptimizedImage,
};
pub use server::{create_router, AppState, ErrorResponse, HealthResponse, RouterConfig};
pub use storage::{FsImageSource, ImageSource};
