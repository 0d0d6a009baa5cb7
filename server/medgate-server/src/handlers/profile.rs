use crate::error::ApiResult;
use crate::middleware::AuthContext;
use crate::server::MedGateServer;
use auth_identity::AccountView;
use axum::{extract::State, Json};

/// GET /profile
pub async fn get_profile(
    State(server): State<MedGateServer>,
    auth: AuthContext,
) -> ApiResult<Json<AccountView>> {
    Ok(Json(server.auth.get_account(auth.account_id).await?))
}
