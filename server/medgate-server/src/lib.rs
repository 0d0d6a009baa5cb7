//! MedGate Server - credential-gated signup and identity API
//!
//! Exposes the auth service, the credential registry checks and the
//! external identity bridge over HTTP. See [`create_app`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

pub use config::AppConfig;
pub use error::*;
pub use server::MedGateServer;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Build the router with tracing, CORS and the request timeout applied
pub fn create_app(server: MedGateServer) -> Router {
    routes::create_routes(server.documents.max_bytes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer())
                .layer(TimeoutLayer::new(server.request_timeout)),
        )
        .with_state(server)
}
