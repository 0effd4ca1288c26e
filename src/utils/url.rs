//! URL utilities for consistent URL handling
//!
//! This module provides utilities for normalizing URLs to prevent issues
//! with trailing slashes when constructing API endpoints.

/// Normalize a base URL by removing trailing slashes
///
/// This ensures consistent URL construction when appending endpoints,
/// preventing double slashes in the final URLs.
///
/// # Examples
///
/// ```
/// use chatmask::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.example.com/v1"), "https://api.example.com/v1");
/// assert_eq!(normalize_base_url("https://api.example.com/v1/"), "https://api.example.com/v1");
/// assert_eq!(normalize_base_url("https://api.example.com/v1///"), "https://api.example.com/v1");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Prefix `https://` to a bare host unless it already has a scheme or is a
/// proxy path starting with `proxy_prefix` (e.g. `/api/xai`).
///
/// ```
/// use chatmask::utils::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("api.x.ai", "/api/xai"), "https://api.x.ai");
/// assert_eq!(ensure_scheme("http://localhost:8088", "/api/xai"), "http://localhost:8088");
/// assert_eq!(ensure_scheme("/api/xai", "/api/xai"), "/api/xai");
/// ```
pub fn ensure_scheme(base_url: &str, proxy_prefix: &str) -> String {
    if base_url.is_empty() || base_url.starts_with("http") || base_url.starts_with(proxy_prefix) {
        base_url.to_string()
    } else {
        format!("https://{base_url}")
    }
}

/// Construct a complete API endpoint URL from a base URL and endpoint path
///
/// This function normalizes the base URL and safely appends the endpoint,
/// ensuring there are no double slashes in the result.
///
/// # Examples
///
/// ```
/// use chatmask::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.example.com/v1", "chat/completions"),
///     "https://api.example.com/v1/chat/completions"
/// );
/// assert_eq!(
///     construct_api_url("https://api.example.com/v1/", "chat/completions"),
///     "https://api.example.com/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}
