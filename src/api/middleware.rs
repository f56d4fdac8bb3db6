//! Middleware Components
//!
//! CORS and request tracking.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{Any, CorsLayer, ExposeHeaders};
use uuid::Uuid;

/// Request ID header key
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create CORS middleware with configurable origins
pub fn create_cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .expose_headers(ExposeHeaders::list([HeaderName::from_static(REQUEST_ID_HEADER)]));

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        // The browser client is served from a different origin
        base.allow_origin(Any)
    } else {
        base.allow_origin(
            allowed_origins
                .into_iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
    }
}

/// Middleware to add request ID to all requests
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    // Reuse a client-supplied ID when present
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Request ID wrapper for extracting in handlers
#[derive(Debug, Clone)]
pub struct RequestId(pub String);
