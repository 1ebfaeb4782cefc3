//! Configuration management for fly-images.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `FLY_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use fly_images::config::Config;
//!
//! // Parse from command line and environment
//! let config = Config::parse();
//!
//! println!("Listening on {}", config.bind_address());
//! println!("Serving images from {}", config.image_folder.display());
//! ```
//!
//! # Environment Variables
//!
//! - `FLY_HOST` - Server bind address (default: 0.0.0.0)
//! - `FLY_PORT` - Server port (default: 3000)
//! - `FLY_IMAGE_FOLDER` - Folder holding source images (required)
//! - `FLY_CACHE_TTL` - Lifetime of cached variants in seconds (default: 86400)
//! - `FLY_CACHE_SIZE` - Max total bytes of cached variants (default: 256MB)
//! - `FLY_CACHE_ENTRIES` - Max number of cached variants (default: 10000)
//! - `FLY_JPEG_QUALITY` - JPEG quality for transformed images (default: 80)
//! - `FLY_MAX_DIMENSION` - Largest crop or resize side in pixels (default: 4096)
//! - `FLY_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `FLY_CORS_ORIGINS` - Allowed CORS origins, comma-separated
//! - `FLY_VIEWPORT_COOKIE` - Cookie carrying the viewport width (default: resolution)

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::optimize::{
    is_valid_quality, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, DEFAULT_JPEG_QUALITY,
    DEFAULT_MAX_DIMENSION, DEFAULT_MAX_ENTRIES,
};
use crate::server::{DEFAULT_CACHE_MAX_AGE, DEFAULT_VIEWPORT_COOKIE};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default lifetime of cached variants, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = DEFAULT_CACHE_TTL.as_secs();

// =============================================================================
// CLI Arguments
// =============================================================================

/// fly-images - A responsive image server.
///
/// Crops or resizes images per viewport breakpoint and caches every variant.
#[derive(Parser, Debug, Clone)]
#[command(name = "fly-images")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "FLY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "FLY_PORT")]
    pub port: u16,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Folder containing the source images. Image identifiers are file names
    /// inside this folder.
    #[arg(long, env = "FLY_IMAGE_FOLDER")]
    pub image_folder: PathBuf,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Lifetime of a cached variant in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS, env = "FLY_CACHE_TTL")]
    pub cache_ttl: u64,

    /// Maximum total size of cached variants in bytes.
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY, env = "FLY_CACHE_SIZE")]
    pub cache_size: usize,

    /// Maximum number of cached variants.
    #[arg(long, default_value_t = DEFAULT_MAX_ENTRIES, env = "FLY_CACHE_ENTRIES")]
    pub cache_entries: usize,

    // =========================================================================
    // Image Configuration
    // =========================================================================
    /// JPEG quality for cropped and resized images (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "FLY_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// Largest width or height a request may crop or resize to, in pixels.
    ///
    /// Larger requests are rejected with 400 Bad Request.
    #[arg(long, default_value_t = DEFAULT_MAX_DIMENSION, env = "FLY_MAX_DIMENSION")]
    pub max_dimension: u32,

    // =========================================================================
    // HTTP Configuration
    // =========================================================================
    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "FLY_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "FLY_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Name of the cookie carrying the client's viewport width.
    #[arg(long, default_value = DEFAULT_VIEWPORT_COOKIE, env = "FLY_VIEWPORT_COOKIE")]
    pub viewport_cookie: String,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.image_folder.as_os_str().is_empty() {
            return Err(
                "Image folder is required. Set --image-folder or FLY_IMAGE_FOLDER".to_string(),
            );
        }

        if self.cache_ttl == 0 {
            return Err("cache_ttl must be greater than 0".to_string());
        }
        if self.cache_size == 0 {
            return Err("cache_size must be greater than 0".to_string());
        }
        if self.cache_entries == 0 {
            return Err("cache_entries must be greater than 0".to_string());
        }

        if !is_valid_quality(self.jpeg_quality) {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }

        if self.max_dimension == 0 {
            return Err("max_dimension must be greater than 0".to_string());
        }

        if !is_cookie_name(&self.viewport_cookie) {
            return Err(format!(
                "viewport_cookie '{}' is not a valid cookie name",
                self.viewport_cookie
            ));
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Lifetime of a cached variant.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

/// Cookie names are RFC 6265 tokens: visible ASCII without separators.
fn is_cookie_name(name: &str) -> bool {
    const SEPARATORS: &str = "()<>@,;:\\\"/[]?={} \t";
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_graphic() && !SEPARATORS.contains(c))
}

// =============================================================================
// Tests
// =============================================================================
