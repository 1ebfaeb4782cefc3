//! Router configuration for fly-images.
//!
//! This module defines the HTTP routes and applies middleware for CORS and
//! request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /health                 - Health check
//! /images/{image_id}      - Optimized image endpoint
//! ```
//!
//! # Example
//!
//! ```ignore
//! use fly_images::optimize::{ImageCache, ImageOptimizer};
//! use fly_images::server::routes::{create_router, RouterConfig};
//! use fly_images::storage::FsImageSource;
//!
//! let optimizer = ImageOptimizer::new(FsImageSource::new("/srv/images"), ImageCache::new());
//!
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(optimizer, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::{CONTENT_TYPE, COOKIE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, image_handler, AppState, DEFAULT_CACHE_MAX_AGE};
use super::viewport::DEFAULT_VIEWPORT_COOKIE;
use crate::optimize::ImageOptimizer;
use crate::storage::ImageSource;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,

    /// Name of the cookie carrying the viewport width
    pub viewport_cookie: String,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Cache max-age is 1 hour (3600 seconds)
    /// - The viewport is read from the `resolution` cookie
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            viewport_cookie: DEFAULT_VIEWPORT_COOKIE.to_string(),
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Set the name of the viewport cookie.
    pub fn with_viewport_cookie(mut self, name: impl Into<String>) -> Self {
        self.viewport_cookie = name.into();
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// # Arguments
///
/// * `optimizer` - The image optimizer handling image requests
/// * `config` - Router configuration
pub fn create_router<S>(optimizer: ImageOptimizer<S>, config: RouterConfig) -> Router
where
    S: ImageSource,
{
    let app_state = AppState::new(optimizer)
        .with_cache_max_age(config.cache_max_age)
        .with_viewport_cookie(config.viewport_cookie.as_str());

    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler::<S>))
        .route("/images/{image_id}", get(image_handler::<S>))
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, COOKIE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        // No origins allowed - this effectively disables CORS
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
