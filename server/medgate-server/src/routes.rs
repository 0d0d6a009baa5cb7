use crate::{
    handlers::{admin, auth, bridge, health, profile, verify},
    server::MedGateServer,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

pub mod paths;

/// Multipart framing on top of the document itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn health_routes() -> Router<MedGateServer> {
    Router::new().route(paths::health::HEALTH, get(health::health_check))
}

pub fn auth_routes(max_upload_bytes: usize) -> Router<MedGateServer> {
    Router::new()
        .route(paths::auth::SIGNUP, post(auth::signup))
        .route(paths::auth::LOGIN, post(auth::login))
        .route(paths::auth::REFRESH, post(auth::refresh))
        .route(paths::auth::LOGOUT, post(auth::logout))
        .route(
            paths::auth::UPLOAD_VERIFICATION,
            post(auth::upload_verification)
                .layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD))),
        )
}

pub fn verify_routes() -> Router<MedGateServer> {
    Router::new()
        .route(paths::verify::DOCTOR, post(verify::verify_doctor))
        .route(paths::verify::STAFF, post(verify::verify_staff))
}

pub fn identity_routes() -> Router<MedGateServer> {
    Router::new()
        .route(paths::auth::SYNC_EXTERNAL_USER, post(bridge::sync_external_user))
        .route(paths::profile::EXTERNAL, get(bridge::get_external_profile))
        .route(paths::profile::OWN, get(profile::get_profile))
}

pub fn admin_routes() -> Router<MedGateServer> {
    Router::new()
        .route(paths::admin::ACCOUNT_VERIFICATION, post(admin::review_verification))
        .route(paths::admin::ACCOUNT_STATUS, put(admin::set_account_status))
}

/// Every route, nested under `/api/v1`
pub fn create_routes(max_upload_bytes: usize) -> Router<MedGateServer> {
    let api_v1 = Router::new()
        .merge(health_routes())
        .merge(auth_routes(max_upload_bytes))
        .merge(verify_routes())
        .merge(identity_routes())
        .merge(admin_routes());

    Router::new().nest(paths::API_V1, api_v1)
}
