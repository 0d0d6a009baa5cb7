use crate::error::ApiResult;
use crate::middleware::ExternalContext;
use crate::server::MedGateServer;
use auth_identity::{AccountView, ExternalSyncRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

/// POST /auth/sync-external-user
pub async fn sync_external_user(
    State(server): State<MedGateServer>,
    ExternalContext(principal): ExternalContext,
    payload: Result<Json<ExternalSyncRequest>, JsonRejection>,
) -> ApiResult<Json<AccountView>> {
    let Json(request) = payload?;
    let view = server
        .external_bridge()?
        .sync_external_user(&principal, request)
        .await?;
    Ok(Json(view))
}

/// GET /external/profile
pub async fn get_external_profile(
    State(server): State<MedGateServer>,
    ExternalContext(principal): ExternalContext,
) -> ApiResult<Json<AccountView>> {
    Ok(Json(server.external_bridge()?.get_profile(&principal.uid).await?))
}
