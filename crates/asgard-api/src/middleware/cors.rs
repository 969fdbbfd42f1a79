//! CORS layer configuration.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use asgard_core::config::CorsConfig;

/// Builds a CORS tower layer from configuration.
///
/// Allows the methods and the custom `X-Token`/`username` headers the
/// backup client sends.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            HeaderName::from_static("x-token"),
            HeaderName::from_static("username"),
            axum::http::header::CONTENT_TYPE,
        ])
        .max_age(std::time::Duration::from_secs(config.max_age_seconds))
}
