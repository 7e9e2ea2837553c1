pub mod auth_context;

pub use auth_context::{require_auth, role_gate, AuthContext};

use std::time::{Duration, Instant};

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::server::{Environment, ServerConfig};

/// Create the CORS layer for the application
///
/// Production pins the configured web app origin; development allows any
/// origin so the local frontend can hit the API from wherever it runs.
pub fn create_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = match (config.environment, config.cors_origin.as_deref()) {
        (Environment::Production, Some(origin)) => match origin.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!(origin = %origin, "Invalid CORS_ORIGIN, falling back to any");
                AllowOrigin::any()
            }
        },
        (Environment::Production, None) => {
            warn!("CORS_ORIGIN not set in production, allowing any origin");
            AllowOrigin::any()
        }
        (Environment::Development, _) => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Request timing middleware
pub async fn request_timing_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        duration_ms = start.elapsed().as_millis(),
        status = response.status().as_u16(),
        "Request processed"
    );

    response
}
