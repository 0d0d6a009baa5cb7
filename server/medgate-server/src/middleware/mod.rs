//! Request extractors and cross-cutting layers

pub mod auth_context;

pub use auth_context::{AuthContext, ExternalContext};

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// CORS policy for the mobile and web clients
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
