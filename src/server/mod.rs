//! HTTP server layer for fly-images.
//!
//! This module provides the HTTP API for serving optimized images.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │               GET /images/{image_id}?lg-w=..&..                 │
//! │                                                                 │
//! │  ┌─────────────┐  ┌──────────────┐  ┌────────────────────────┐  │
//! │  │  handlers   │  │   viewport   │  │        routes          │  │
//! │  │ (requests)  │  │ (cookie/hint)│  │   (router config)      │  │
//! │  └─────────────┘  └──────────────┘  └────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;
pub mod viewport;

pub use handlers::{
    health_handler, image_handler, AppState, ErrorResponse, HealthResponse, DEFAULT_CACHE_MAX_AGE,
};
pub use routes::{create_router, RouterConfig};
pub use viewport::{cookie_value, viewport_signal, DEFAULT_VIEWPORT_COOKIE};
