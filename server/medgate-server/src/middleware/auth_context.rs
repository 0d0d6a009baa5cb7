//! Bearer-token extractors
//!
//! [`AuthContext`] resolves a MedGate access token, [`ExternalContext`] a
//! token minted by the external identity provider.

use crate::error::ApiError;
use crate::server::MedGateServer;
use auth_identity::{ExternalPrincipal, Role};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use uuid::Uuid;

/// Caller authenticated with a MedGate access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub account_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Caller authenticated by the external identity provider
#[derive(Debug, Clone)]
pub struct ExternalContext(pub ExternalPrincipal);

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::authentication("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::authentication("Invalid Authorization header format. Expected: Bearer <token>"))
}

#[async_trait]
impl FromRequestParts<MedGateServer> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &MedGateServer) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.auth.authenticate(token)?;
        let account_id = claims.account_id()?;

        Ok(AuthContext {
            account_id,
            role: claims.role,
        })
    }
}

#[async_trait]
impl FromRequestParts<MedGateServer> for ExternalContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &MedGateServer) -> Result<Self, Self::Rejection> {
        let bridge = state.external_bridge()?;
        let token = bearer_token(parts)?;
        Ok(ExternalContext(bridge.authenticate(token).await?))
    }
}
