//! Access and refresh credentials.
//!
//! Both are HS256 JWTs signed with distinct secrets. Refresh credentials are
//! persisted only as the SHA-256 digest returned by [`hash_refresh_token`].

use crate::config::TokenConfig;
use crate::error::{IdentityError, Result};
use crate::models::{Account, Role};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Account id
    pub sub: String,
    pub role: Role,
    pub typ: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl AccessClaims {
    pub fn account_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| IdentityError::InvalidToken)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub typ: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl RefreshClaims {
    pub fn account_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| IdentityError::InvalidToken)
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            config,
        })
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.config.access_ttl_secs
    }

    pub fn issue_access(&self, account: &Account) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.access_ttl_secs);
        let claims = AccessClaims {
            sub: account.id.to_string(),
            role: account.role,
            typ: ACCESS_TOKEN_TYPE.to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|e| IdentityError::TokenError(format!("JWT encode: {}", e)))?;
        Ok(IssuedToken { token, expires_at })
    }

    pub fn issue_refresh(&self, account_id: Uuid) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.refresh_ttl_secs);
        let claims = RefreshClaims {
            sub: account_id.to_string(),
            typ: REFRESH_TOKEN_TYPE.to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|e| IdentityError::TokenError(format!("JWT encode: {}", e)))?;
        Ok(IssuedToken { token, expires_at })
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims> {
        let claims: AccessClaims = jsonwebtoken::decode(token, &self.access_decoding, &self.validation())
            .map(|data| data.claims)
            .map_err(map_jwt_error)?;

        if claims.typ != ACCESS_TOKEN_TYPE {
            return Err(IdentityError::InvalidToken);
        }
        Ok(claims)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims> {
        let claims: RefreshClaims = jsonwebtoken::decode(token, &self.refresh_decoding, &self.validation())
            .map(|data| data.claims)
            .map_err(map_jwt_error)?;

        if claims.typ != REFRESH_TOKEN_TYPE {
            return Err(IdentityError::InvalidToken);
        }
        Ok(claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);
        validation.leeway = 5;
        validation
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> IdentityError {
    match error.kind() {
        ErrorKind::ExpiredSignature => IdentityError::TokenExpired,
        _ => IdentityError::InvalidToken,
    }
}

/// SHA-256 digest of a refresh credential, base64url without padding.
///
/// This is the value stored as `sessions.token_hash`.
pub fn hash_refresh_token(raw: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(raw.as_bytes()))
}
