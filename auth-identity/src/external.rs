//! Verification of tokens minted by the external identity provider.
//!
//! The verifier is built once at start-up and shared as a trait object.

use crate::error::{IdentityError, Result};
use async_trait::async_trait;
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Principal authenticated by the external provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPrincipal {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
}

#[async_trait]
pub trait ExternalTokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<ExternalPrincipal>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalAuthConfig {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    /// Shared secret for HS256-signed tokens
    pub hs256_secret: Option<String>,
    /// PEM public key for RS256-signed tokens; wins over `hs256_secret`
    pub rs256_public_key_pem: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExternalClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

/// JWT-based verifier: `sub` is the external UID
pub struct JwtExternalVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtExternalVerifier {
    pub fn from_config(config: &ExternalAuthConfig) -> Result<Self> {
        let (key, algorithm) = match (&config.rs256_public_key_pem, &config.hs256_secret) {
            (Some(pem), _) => (
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| IdentityError::TokenError(format!("bad external public key: {}", e)))?,
                Algorithm::RS256,
            ),
            (None, Some(secret)) if !secret.is_empty() => {
                (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
            }
            _ => {
                return Err(IdentityError::TokenError(
                    "external auth requires hs256_secret or rs256_public_key_pem".to_string(),
                ))
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["sub", "exp"]);
        match &config.issuer {
            Some(issuer) => validation.set_issuer(&[issuer]),
            None => validation.iss = None,
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self { key, validation })
    }
}

#[async_trait]
impl ExternalTokenVerifier for JwtExternalVerifier {
    async fn verify(&self, token: &str) -> Result<ExternalPrincipal> {
        let claims = jsonwebtoken::decode::<ExternalClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::TokenExpired,
                _ => IdentityError::InvalidToken,
            })?;

        if claims.sub.trim().is_empty() {
            return Err(IdentityError::InvalidToken);
        }

        Ok(ExternalPrincipal {
            uid: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified,
        })
    }
}
