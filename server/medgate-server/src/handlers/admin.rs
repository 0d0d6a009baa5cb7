//! Verification review and account status management

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthContext;
use crate::server::MedGateServer;
use auth_identity::{AccountStatus, AccountView, ReviewDecision};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: AccountStatus,
}

fn require_admin(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(ApiError::authorization("Administrator access required"))
    }
}

/// POST /admin/accounts/:id/verification
pub async fn review_verification(
    State(server): State<MedGateServer>,
    auth: AuthContext,
    Path(account_id): Path<Uuid>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult<Json<AccountView>> {
    require_admin(&auth)?;
    let Json(request) = payload?;
    let view = server
        .auth
        .review_verification(auth.account_id, account_id, request.decision)
        .await?;
    Ok(Json(view))
}

/// PUT /admin/accounts/:id/status
pub async fn set_account_status(
    State(server): State<MedGateServer>,
    auth: AuthContext,
    Path(account_id): Path<Uuid>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Json<AccountView>> {
    require_admin(&auth)?;
    let Json(request) = payload?;
    let view = server
        .auth
        .set_account_status(auth.account_id, account_id, request.status)
        .await?;
    Ok(Json(view))
}
