//! Variant cache behavior through the HTTP surface.
//!
//! Tests verify:
//! - Repeat requests are served from cache without touching the source
//! - Cache keys follow the raw query string
//! - Cache read and write failures degrade to uncached serving
//! - Corrupt cache entries surface as decode errors

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use bytes::Bytes;

use fly_images::optimize::{CacheKey, CacheStore, ImageCache, ImageOptimizer};
use fly_images::{create_router, RouterConfig};

use super::test_utils::{
    body_bytes, create_test_jpeg, get, header, image_dimensions, CountingSource, FlakyCache,
    ImageFolder,
};

fn router_with(optimizer: ImageOptimizer<CountingSource<fly_images::FsImageSource>>) -> Router {
    create_router(optimizer, RouterConfig::new().with_tracing(false))
}

// =============================================================================
// Hits and Misses
// =============================================================================

#[tokio::test]
async fn test_second_request_is_cache_hit() {
    let folder = ImageFolder::new().with_image("photo.jpg", &create_test_jpeg(400, 300));
    let source = CountingSource::new(folder.source());
    let reads = source.reads();
    let router = router_with(ImageOptimizer::new(source, ImageCache::new()));

    let uri = "/images/photo.jpg?lg-w=100&lg-h=100";

    let first = get(&router, uri, Some("1300")).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(header(&first, "x-image-cache-hit"), "false");
    let first_body = body_bytes(first).await;

    let second = get(&router, uri, Some("1300")).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(header(&second, "x-image-cache-hit"), "true");
    assert_eq!(header(&second, "content-type"), "image/jpeg");
    let second_body = body_bytes(second).await;

    assert_eq!(first_body, second_body);
    assert_eq!(reads.read().await.get("photo.jpg"), Some(&1));
}

#[tokio::test]
async fn test_reordered_query_is_separate_entry() {
    let folder = ImageFolder::new().with_image("photo.jpg", &create_test_jpeg(400, 300));
    let source = CountingSource::new(folder.source());
    let reads = source.reads();
    let cache = Arc::new(ImageCache::new());
    let optimizer = ImageOptimizer::with_shared_cache(Arc::new(source), cache.clone());
    let router = router_with(optimizer);

    let a = get(&router, "/images/photo.jpg?lg-w=100&lg-h=100", Some("1300")).await;
    let b = get(&router, "/images/photo.jpg?lg-h=100&lg-w=100", Some("1300")).await;

    assert_eq!(header(&a, "x-image-cache-hit"), "false");
    assert_eq!(header(&b, "x-image-cache-hit"), "false");
    assert_eq!(cache.len().await, 2);
    assert_eq!(reads.read().await.get("photo.jpg"), Some(&2));
}

#[tokio::test]
async fn test_cached_variant_ignores_viewport() {
    let folder = ImageFolder::new().with_image("photo.jpg", &create_test_jpeg(400, 300));
    let router = router_with(ImageOptimizer::new(
        CountingSource::new(folder.source()),
        ImageCache::new(),
    ));

    let uri = "/images/photo.jpg?lg-w=120&lg-h=120&xs-w=30&xs-h=30";

    let large = get(&router, uri, Some("1300")).await;
    assert_eq!(image_dimensions(&body_bytes(large).await), (120, 120));

    // Same key, different tier: the stored variant is reused
    let small = get(&router, uri, Some("320")).await;
    assert_eq!(header(&small, "x-image-cache-hit"), "true");
    assert_eq!(header(&small, "x-image-tier"), "xs");
    assert_eq!(image_dimensions(&body_bytes(small).await), (120, 120));
}

#[tokio::test]
async fn test_not_found_is_not_cached() {
    let folder = ImageFolder::new();
    let cache = Arc::new(ImageCache::new());
    let source = Arc::new(CountingSource::new(folder.source()));
    let router = router_with(ImageOptimizer::with_shared_cache(source, cache.clone()));

    let response = get(&router, "/images/missing.jpg?lg-w=10&lg-h=10", Some("1300")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(cache.is_empty().await);
}

// =============================================================================
// Cache Failures
// =============================================================================

#[tokio::test]
async fn test_write_failure_still_serves() {
    let folder = ImageFolder::new().with_image("photo.jpg", &create_test_jpeg(400, 300));
    let cache = Arc::new(FlakyCache::new());
    cache.fail_writes(true);

    let source = Arc::new(CountingSource::new(folder.source()));
    let reads = source.reads();
    let router = router_with(ImageOptimizer::with_shared_cache(source, cache.clone()));

    let uri = "/images/photo.jpg?lg-w=80&lg-h=80";
    for _ in 0..2 {
        let response = get(&router, uri, Some("1300")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "x-image-cache-hit"), "false");
        assert_eq!(image_dimensions(&body_bytes(response).await), (80, 80));
    }

    assert_eq!(cache.write_attempts(), 2);
    assert_eq!(reads.read().await.get("photo.jpg"), Some(&2));
}

#[tokio::test]
async fn test_read_failure_is_treated_as_miss() {
    let folder = ImageFolder::new().with_image("photo.jpg", &create_test_jpeg(400, 300));
    let cache = Arc::new(FlakyCache::new());
    let source = Arc::new(CountingSource::new(folder.source()));
    let reads = source.reads();
    let router = router_with(ImageOptimizer::with_shared_cache(source, cache.clone()));

    let uri = "/images/photo.jpg?lg-w=80&lg-h=80";
    let warm = get(&router, uri, Some("1300")).await;
    assert_eq!(warm.status(), StatusCode::OK);

    cache.fail_reads(true);
    let response = get(&router, uri, Some("1300")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-image-cache-hit"), "false");
    assert_eq!(reads.read().await.get("photo.jpg"), Some(&2));
}

#[tokio::test]
async fn test_corrupt_entry_fails_without_source_read() {
    let folder = ImageFolder::new().with_image("photo.jpg", &create_test_jpeg(400, 300));
    let cache = Arc::new(ImageCache::new());
    cache
        .add(
            CacheKey::new("photo.jpg", "lg-w=50&lg-h=50"),
            Bytes::from_static(b"garbage bytes"),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    let source = Arc::new(CountingSource::new(folder.source()));
    let reads = source.reads();
    let router = router_with(ImageOptimizer::with_shared_cache(source, cache.clone()));

    let response = get(&router, "/images/photo.jpg?lg-w=50&lg-h=50", Some("1300")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_bytes(response).await;
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "decode_error");
    assert!(reads.read().await.get("photo.jpg").is_none());
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_concurrent_identical_requests() {
    let folder = ImageFolder::new().with_image("photo.jpg", &create_test_jpeg(640, 480));
    let router = router_with(ImageOptimizer::new(
        CountingSource::new(folder.source()),
        ImageCache::new(),
    ));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            let response = get(&router, "/images/photo.jpg?lg-w=64&lg-h=64", Some("1300")).await;
            assert_eq!(response.status(), StatusCode::OK);
            body_bytes(response).await
        }));
    }

    let mut bodies = Vec::new();
    for handle in handles {
        bodies.push(handle.await.unwrap());
    }

    for body in &bodies {
        assert_eq!(image_dimensions(body), (64, 64));
    }
    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}
