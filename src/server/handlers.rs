//! HTTP request handlers for the fly-images API.
//!
//! This module contains the Axum handlers for serving images and health checks.
//!
//! # Endpoints
//!
//! - `GET /images/{image_id}?<tier>-<w|h>=<px>&...` - Serve an optimized image
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{IoError, OptimizeError};
use crate::optimize::{CacheStats, ImageOptimizer};
use crate::storage::ImageSource;

use super::viewport::{viewport_signal, DEFAULT_VIEWPORT_COOKIE};

/// Default Cache-Control max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

const CACHE_HIT_HEADER: HeaderName = HeaderName::from_static("x-image-cache-hit");
const TIER_HEADER: HeaderName = HeaderName::from_static("x-image-tier");

/// Responses depend on the viewport hint as well as the URL.
const VARY_VALUE: &str = "Cookie, Sec-CH-Viewport-Width, Viewport-Width";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the image optimizer.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: ImageSource> {
    /// The optimizer for processing image requests
    pub optimizer: Arc<ImageOptimizer<S>>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,

    /// Name of the cookie carrying the viewport width
    pub viewport_cookie: Arc<str>,
}

impl<S: ImageSource> AppState<S> {
    /// Create a new application state with the given optimizer.
    pub fn new(optimizer: ImageOptimizer<S>) -> Self {
        Self {
            optimizer: Arc::new(optimizer),
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            viewport_cookie: Arc::from(DEFAULT_VIEWPORT_COOKIE),
        }
    }

    /// Set the Cache-Control max-age.
    pub fn with_cache_max_age(mut self, cache_max_age: u32) -> Self {
        self.cache_max_age = cache_max_age;
        self
    }

    /// Read the viewport width from the cookie called `name`.
    pub fn with_viewport_cookie(mut self, name: impl Into<Arc<str>>) -> Self {
        self.viewport_cookie = name.into();
        self
    }
}

impl<S: ImageSource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            optimizer: Arc::clone(&self.optimizer),
            cache_max_age: self.cache_max_age,
            viewport_cookie: Arc::clone(&self.viewport_cookie),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "decode_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Variant cache occupancy, when the store reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert OptimizeError to HTTP response.
///
/// 5xx errors are logged at ERROR level; 404s at DEBUG since they are common
/// and expected.
impl IntoResponse for OptimizeError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            OptimizeError::SourceNotFound { image_id } => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Image not found: {}", image_id),
            ),

            OptimizeError::Io(io_err) => match io_err {
                IoError::NotFound(path) => (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    format!("Resource not found: {}", path),
                ),
                IoError::Read(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "io_error",
                    format!("I/O error: {}", io_err),
                ),
            },

            // 400 Bad Request - Invalid parameters
            OptimizeError::DimensionTooLarge { requested, max } => (
                StatusCode::BAD_REQUEST,
                "invalid_dimension",
                format!(
                    "Invalid dimension: {}px (must be at most {}px)",
                    requested, max
                ),
            ),

            OptimizeError::DecodeFailure { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "decode_error",
                format!("Failed to decode image: {}", message),
            ),

            OptimizeError::EncodeFailure { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "encode_error",
                format!("Failed to encode image: {}", message),
            ),

            OptimizeError::Task(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                format!("Image processing failed: {}", message),
            ),
        };

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle image requests.
///
/// # Endpoint
///
/// `GET /images/{image_id}`
///
/// # Query Parameters
///
/// Any number of `<tier>-<axis>=<pixels>` pairs, where tier is one of
/// `lg`, `md`, `sm`, `xs` and axis is `w` or `h`. Other parameters are
/// ignored for sizing but still distinguish cache entries.
///
/// # Viewport
///
/// Read from the `resolution` cookie (configurable), falling back to the
/// `Sec-CH-Viewport-Width` and `Viewport-Width` headers.
///
/// # Response
///
/// - `200 OK`: Image bytes with `Content-Type` of the detected format
/// - `400 Bad Request`: A crop or resize side above the configured maximum
/// - `404 Not Found`: No stored image with that identifier
/// - `500 Internal Server Error`: Decode, encode or storage failure
///
/// # Headers
///
/// - `Content-Type: image/jpeg` (or the detected format)
/// - `Cache-Control: public, max-age={cache_max_age}`
/// - `Vary: Cookie, Sec-CH-Viewport-Width, Viewport-Width`
/// - `X-Image-Cache-Hit: true|false`
/// - `X-Image-Tier: lg|md|sm|xs`
pub async fn image_handler<S: ImageSource>(
    State(state): State<AppState<S>>,
    Path(image_id): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, OptimizeError> {
    let query = query.unwrap_or_default();
    let viewport = viewport_signal(&headers, &state.viewport_cookie);

    let image = state
        .optimizer
        .optimize(&image_id, &query, viewport.as_deref())
        .await?;

    let response_headers = [
        (header::CONTENT_TYPE, image.content_type.to_string()),
        (
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.cache_max_age),
        ),
        (header::VARY, VARY_VALUE.to_string()),
        (CACHE_HIT_HEADER, image.cache_hit.to_string()),
        (TIER_HEADER, image.tier.to_string()),
    ];

    Ok((StatusCode::OK, response_headers, image.data).into_response())
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "cache": { "size": 1024, "capacity": 268435456, "entries": 1 }
/// }
/// ```
pub async fn health_handler<S: ImageSource>(
    State(state): State<AppState<S>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: state.optimizer.cache_stats().await,
    })
}

// =============================================================================
// Tests
// =============================================================================
