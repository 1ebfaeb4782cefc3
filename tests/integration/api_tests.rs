//! API integration tests for image serving and error handling.
//!
//! Tests verify:
//! - Crop, resize and passthrough per viewport tier
//! - Tier resolution from cookie and client-hint headers
//! - Error cases (missing image, traversal, oversized dimension, corrupt source)
//! - HTTP response codes and headers

use axum::http::StatusCode;

use fly_images::optimize::{ImageCache, ImageOptimizer};
use fly_images::{create_router, RouterConfig};

use super::test_utils::{
    body_bytes, create_test_jpeg, create_test_png, folder_router, get, header, image_dimensions,
    is_valid_jpeg, ImageFolder,
};

// =============================================================================
// Transforms
// =============================================================================

#[tokio::test]
async fn test_crop_on_large_viewport() {
    let folder = ImageFolder::new().with_image("photo.jpg", &create_test_jpeg(640, 480));
    let router = folder_router(&folder);

    let response = get(&router, "/images/photo.jpg?lg-w=200&lg-h=200", Some("1300")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "image/jpeg");
    assert_eq!(header(&response, "x-image-tier"), "lg");
    assert!(header(&response, "cache-control").contains("max-age=3600"));
    assert!(header(&response, "vary").contains("Cookie"));

    let body = body_bytes(response).await;
    assert!(is_valid_jpeg(&body));
    assert_eq!(image_dimensions(&body), (200, 200));
}

#[tokio::test]
async fn test_resize_square_source_into_wide_box() {
    let folder = ImageFolder::new().with_image("square.jpg", &create_test_jpeg(800, 800));
    let router = folder_router(&folder);

    let response = get(&router, "/images/square.jpg?lg-w=400&lg-h=200", Some("1300")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    assert_eq!(image_dimensions(&body), (200, 200));
}

#[tokio::test]
async fn test_resize_never_exceeds_bounds() {
    let folder = ImageFolder::new().with_image("wide.png", &create_test_png(900, 300));
    let router = folder_router(&folder);

    let response = get(&router, "/images/wide.png?md-w=300&md-h=250", Some("1000")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "image/png");
    let (width, height) = image_dimensions(&body_bytes(response).await);
    assert_eq!((width, height), (300, 100));
}

#[tokio::test]
async fn test_passthrough_returns_source_bytes() {
    let source = create_test_jpeg(120, 90);
    let folder = ImageFolder::new().with_image("photo.jpg", &source);
    let router = folder_router(&folder);

    for resolution in [None, Some("400"), Some("1920")] {
        let response = get(&router, "/images/photo.jpg", resolution).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "content-type"), "image/jpeg");
        assert_eq!(&body_bytes(response).await[..], &source[..]);
    }
}

#[tokio::test]
async fn test_single_dimension_is_passthrough() {
    let source = create_test_png(64, 32);
    let folder = ImageFolder::new().with_image("photo.png", &source);
    let router = folder_router(&folder);

    let response = get(&router, "/images/photo.png?lg-w=10", Some("1300")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], &source[..]);
}

// =============================================================================
// Tier Resolution
// =============================================================================

#[tokio::test]
async fn test_small_viewport_inherits_larger_tier() {
    let folder = ImageFolder::new().with_image("photo.jpg", &create_test_jpeg(500, 500));
    let router = folder_router(&folder);

    let response = get(&router, "/images/photo.jpg?md-w=150&md-h=150", Some("500")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-image-tier"), "xs");
    assert_eq!(image_dimensions(&body_bytes(response).await), (150, 150));
}

#[tokio::test]
async fn test_large_viewport_ignores_smaller_tier() {
    let source = create_test_jpeg(500, 500);
    let folder = ImageFolder::new().with_image("photo.jpg", &source);
    let router = folder_router(&folder);

    let response = get(&router, "/images/photo.jpg?xs-w=100&xs-h=100", Some("1400")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-image-tier"), "lg");
    assert_eq!(&body_bytes(response).await[..], &source[..]);
}

#[tokio::test]
async fn test_each_tier_picks_its_own_dimensions() {
    let folder = ImageFolder::new().with_image("photo.png", &create_test_png(400, 400));
    let router = folder_router(&folder);
    let query = "lg-w=200&lg-h=200&md-w=150&md-h=150&sm-w=100&sm-h=100&xs-w=50&xs-h=50";

    for (resolution, tier, side) in [
        ("1200", "lg", 200),
        ("1199", "md", 150),
        ("992", "md", 150),
        ("991", "sm", 100),
        ("768", "sm", 100),
        ("767", "xs", 50),
    ] {
        // Distinct query per request so no tier reads another tier's cached variant
        let uri = format!("/images/photo.png?{}&v={}", query, resolution);
        let response = get(&router, &uri, Some(resolution)).await;
        assert_eq!(header(&response, "x-image-tier"), tier, "width {}", resolution);
        assert_eq!(
            image_dimensions(&body_bytes(response).await),
            (side, side),
            "width {}",
            resolution
        );
    }
}

#[tokio::test]
async fn test_missing_or_malformed_cookie_uses_smallest_tier() {
    let folder = ImageFolder::new().with_image("photo.png", &create_test_png(300, 300));
    let router = folder_router(&folder);

    let response = get(&router, "/images/photo.png?xs-w=40&xs-h=40", None).await;
    assert_eq!(header(&response, "x-image-tier"), "xs");
    assert_eq!(image_dimensions(&body_bytes(response).await), (40, 40));

    let response = get(&router, "/images/photo.png?xs-w=40&xs-h=40&b", Some("wide")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-image-tier"), "xs");
}

#[tokio::test]
async fn test_client_hint_header() {
    let folder = ImageFolder::new().with_image("photo.png", &create_test_png(300, 300));
    let router = folder_router(&folder);

    let request = axum::http::Request::builder()
        .uri("/images/photo.png?sm-w=60&sm-h=60")
        .header("sec-ch-viewport-width", "800")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(router, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-image-tier"), "sm");
}

#[tokio::test]
async fn test_custom_viewport_cookie() {
    let folder = ImageFolder::new().with_image("photo.png", &create_test_png(300, 300));
    let optimizer = ImageOptimizer::new(folder.source(), ImageCache::new());
    let router = create_router(
        optimizer,
        RouterConfig::new()
            .with_viewport_cookie("vw")
            .with_cache_max_age(60)
            .with_tracing(false),
    );

    let request = axum::http::Request::builder()
        .uri("/images/photo.png?lg-w=90&lg-h=90")
        .header("cookie", "resolution=300; vw=1500")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(router, request).await.unwrap();

    assert_eq!(header(&response, "x-image-tier"), "lg");
    assert_eq!(header(&response, "cache-control"), "public, max-age=60");
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_missing_image_returns_404() {
    let folder = ImageFolder::new();
    let router = folder_router(&folder);

    let response = get(&router, "/images/nope.jpg?lg-w=10&lg-h=10", Some("1300")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_bytes(response).await;
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "not_found");
    assert_eq!(error["status"], 404);
}

#[tokio::test]
async fn test_encoded_traversal_returns_404() {
    let folder = ImageFolder::new();
    let router = folder_router(&folder);

    let response = get(&router, "/images/..%2Fsecret.jpg", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_dimension_returns_400() {
    let folder = ImageFolder::new().with_image("photo.png", &create_test_png(8, 8));
    let router = folder_router(&folder);

    let response = get(
        &router,
        "/images/photo.png?lg-w=4000000000&lg-h=4000000000",
        Some("1300"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_bytes(response).await;
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "invalid_dimension");
    assert_eq!(error["status"], 400);

    // The server keeps serving after rejecting the request
    let response = get(&router, "/images/photo.png?lg-w=4&lg-h=4", Some("1300")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(image_dimensions(&body_bytes(response).await), (4, 4));
}

#[tokio::test]
async fn test_configured_max_dimension() {
    let folder = ImageFolder::new().with_image("photo.png", &create_test_png(300, 300));
    let optimizer = ImageOptimizer::new(folder.source(), ImageCache::new()).with_max_dimension(100);
    let router = create_router(optimizer, RouterConfig::new().with_tracing(false));

    let response = get(&router, "/images/photo.png?xs-w=80&xs-h=120", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&router, "/images/photo.png?xs-w=100&xs-h=100", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_corrupt_source_returns_500() {
    let folder = ImageFolder::new().with_image("broken.jpg", b"this is not a jpeg");
    let router = folder_router(&folder);

    let response = get(&router, "/images/broken.jpg", None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_bytes(response).await;
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "decode_error");
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_cache() {
    let folder = ImageFolder::new().with_image("photo.png", &create_test_png(20, 20));
    let router = folder_router(&folder);

    get(&router, "/images/photo.png", None).await;

    let response = get(&router, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await;
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["cache"]["entries"], 1);
}
