//! Viewport-size hint extraction.
//!
//! Clients report their viewport width out of band. The primary channel is a
//! cookie (named `resolution` by default) set by a small script on the page:
//!
//! ```text
//! document.cookie = "resolution=" + window.innerWidth + "; path=/";
//! ```
//!
//! Browsers that support responsive client hints send `Sec-CH-Viewport-Width`
//! (or the legacy `Viewport-Width`) instead; those are consulted when the
//! cookie is absent.

use axum::http::{header, HeaderMap, HeaderName};

/// Default name of the viewport cookie.
pub const DEFAULT_VIEWPORT_COOKIE: &str = "resolution";

/// Client-hint headers consulted after the cookie, in order.
pub const VIEWPORT_HINT_HEADERS: [HeaderName; 2] = [
    HeaderName::from_static("sec-ch-viewport-width"),
    HeaderName::from_static("viewport-width"),
];

/// Find the raw viewport signal in the request headers.
///
/// Returns the value exactly as sent (minus surrounding whitespace and
/// quotes); interpreting it is left to tier resolution.
pub fn viewport_signal(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    cookie_value(headers, cookie_name).or_else(|| {
        VIEWPORT_HINT_HEADERS.iter().find_map(|name| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.trim().to_string())
        })
    })
}

/// Look up a cookie by name across all `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}
