//! fly-images - A responsive image server.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fly_images::{
    config::Config,
    optimize::{ImageCache, ImageCodec, ImageOptimizer},
    server::{create_router, RouterConfig},
    storage::FsImageSource,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    run_serve(config).await
}

async fn run_serve(config: Config) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("fly-images v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Image folder: {}", config.image_folder.display());
    info!(
        "  Cache: {}MB, {} entries, ttl {}s",
        config.cache_size / (1024 * 1024),
        config.cache_entries,
        config.cache_ttl
    );
    info!("  JPEG quality: {}", config.jpeg_quality);
    info!("  Max dimension: {}px", config.max_dimension);
    info!("  Viewport cookie: {}", config.viewport_cookie);

    match tokio::fs::metadata(&config.image_folder).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            error!(
                "Image folder {} is not a directory",
                config.image_folder.display()
            );
            return ExitCode::FAILURE;
        }
        Err(e) => {
            // Requests 404 until the folder appears
            warn!(
                "Image folder {} is not accessible: {}",
                config.image_folder.display(),
                e
            );
        }
    }

    let source = FsImageSource::new(&config.image_folder);
    let cache = ImageCache::with_capacity_and_entries(config.cache_size, config.cache_entries);
    let optimizer = ImageOptimizer::new(source, cache)
        .with_codec(ImageCodec::with_quality(config.jpeg_quality))
        .with_ttl(config.cache_ttl())
        .with_max_dimension(config.max_dimension);

    let router = create_router(optimizer, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("Server listening on: http://{}", addr);
    info!("  curl http://{}/health", addr);
    info!(
        "  curl -b 'resolution=1280' 'http://{}/images/<image>?lg-w=400&lg-h=400'",
        addr
    );
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "fly_images=debug,tower_http=debug"
    } else {
        "fly_images=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_viewport_cookie(config.viewport_cookie.clone())
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}
