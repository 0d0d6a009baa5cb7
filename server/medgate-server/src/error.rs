use auth_identity::{FieldErrors, IdentityError, Role};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use credential_registry::RegistryError;
use error_common::codes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable message
    pub error: String,
    pub error_type: String,
    /// Stable machine-readable code
    pub error_code: String,
    /// Correlates the response with the server-side log entry
    pub error_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Option<FieldErrors>,
    },

    #[error("{message}")]
    Authentication { message: String, code: &'static str },

    #[error("{message}")]
    Authorization { message: String, code: &'static str },

    /// Doctor or staff credentials did not check out
    #[error("{message}")]
    Verification { message: String, code: &'static str },

    #[error("{resource_type} not found")]
    NotFound { resource_type: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    PayloadTooLarge { message: String },

    #[error("{message}")]
    UnsupportedMediaType { message: String },

    /// `message` goes to the client, `detail` only to the log
    #[error("{message}")]
    ServiceUnavailable {
        message: String,
        code: &'static str,
        detail: String,
    },

    #[error("Internal server error")]
    Internal { detail: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            message: "Validation failed".to_string(),
            field_errors: Some(FieldErrors::single(field, message)),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            code: codes::authentication::TOKEN_INVALID,
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
            code: codes::authorization::ACCESS_DENIED,
        }
    }

    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
            code: codes::dependency::STORE_UNAVAILABLE,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Authorization { .. } => StatusCode::FORBIDDEN,
            ApiError::Verification { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            // Duplicate registrations are reported as bad requests
            ApiError::Conflict { .. } => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::Authorization { .. } => "authorization_error",
            ApiError::Verification { .. } => "verification_failed",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::PayloadTooLarge { .. } => "payload_too_large",
            ApiError::UnsupportedMediaType { .. } => "unsupported_media_type",
            ApiError::ServiceUnavailable { .. } => "service_unavailable",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => codes::validation::INVALID_INPUT,
            ApiError::Authentication { code, .. }
            | ApiError::Authorization { code, .. }
            | ApiError::Verification { code, .. }
            | ApiError::ServiceUnavailable { code, .. } => *code,
            ApiError::NotFound { .. } => codes::resource::NOT_FOUND,
            ApiError::Conflict { .. } => codes::resource::EMAIL_IN_USE,
            ApiError::PayloadTooLarge { .. } => codes::validation::INVALID_INPUT,
            ApiError::UnsupportedMediaType { .. } => codes::validation::UNSUPPORTED_MEDIA,
            ApiError::Internal { .. } => codes::system::INTERNAL,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        match &self {
            ApiError::Internal { detail } => error!(
                error_id = %error_id,
                error_code = self.error_code(),
                detail = %detail,
                "Request failed with internal error"
            ),
            ApiError::ServiceUnavailable { detail, .. } => error!(
                error_id = %error_id,
                error_code = self.error_code(),
                detail = %detail,
                "Dependency unavailable"
            ),
            _ => warn!(
                error_id = %error_id,
                error_type = self.error_type(),
                status_code = status_code.as_u16(),
                error = %self,
                "Request rejected"
            ),
        }

        let field_errors = match &self {
            ApiError::Validation { field_errors, .. } => field_errors.clone(),
            _ => None,
        };

        let body = ApiErrorResponse {
            error: self.to_string(),
            error_type: self.error_type().to_string(),
            error_code: self.error_code().to_string(),
            error_id,
            field_errors,
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        let message = err.to_string();
        match err {
            IdentityError::Validation(field_errors) => ApiError::Validation {
                message,
                field_errors: Some(field_errors),
            },
            IdentityError::InvalidCredentials => ApiError::Authentication {
                message,
                code: codes::authentication::INVALID_CREDENTIALS,
            },
            IdentityError::InvalidToken => ApiError::Authentication {
                message,
                code: codes::authentication::TOKEN_INVALID,
            },
            IdentityError::TokenExpired => ApiError::Authentication {
                message,
                code: codes::authentication::TOKEN_EXPIRED,
            },
            IdentityError::InvalidSession => ApiError::Authentication {
                message,
                code: codes::authentication::SESSION_INVALID,
            },
            IdentityError::AccountSuspended => ApiError::Authorization {
                message,
                code: codes::authentication::ACCOUNT_SUSPENDED,
            },
            IdentityError::AccountPendingVerification => ApiError::Authorization {
                message,
                code: codes::authentication::ACCOUNT_PENDING_VERIFICATION,
            },
            IdentityError::UidMismatch => ApiError::Authorization {
                message,
                code: codes::authorization::UID_MISMATCH,
            },
            IdentityError::Forbidden(message) => ApiError::Authorization {
                message,
                code: codes::authorization::ACCESS_DENIED,
            },
            IdentityError::VerificationFailed { role, message } => {
                let code = match role {
                    Role::Doctor => codes::verification::DOCTOR_NOT_VERIFIED,
                    Role::Staff => codes::verification::STAFF_NOT_VERIFIED,
                    _ => codes::verification::DOMAIN_NOT_ALLOWED,
                };
                ApiError::Verification { message, code }
            }
            IdentityError::NotFound => ApiError::not_found("Account"),
            IdentityError::EmailAlreadyInUse | IdentityError::ExternalUidAlreadyLinked => {
                ApiError::Conflict { message }
            }
            IdentityError::VerificationUnavailable(source) => ApiError::ServiceUnavailable {
                message,
                code: codes::dependency::REGISTRY_UNAVAILABLE,
                detail: source.to_string(),
            },
            IdentityError::StoreUnavailable(_) | IdentityError::DatabaseError(_) => ApiError::ServiceUnavailable {
                message: "Service temporarily unavailable".to_string(),
                code: codes::dependency::STORE_UNAVAILABLE,
                detail: message,
            },
            IdentityError::TokenError(_) => ApiError::ServiceUnavailable {
                message: "Service temporarily unavailable".to_string(),
                code: codes::dependency::TOKEN_SERVICE,
                detail: message,
            },
            IdentityError::ProfileMismatch { .. }
            | IdentityError::HashingError(_)
            | IdentityError::InternalError(_) => ApiError::internal(message),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidRecord(message) | RegistryError::InvalidSeed(message) => {
                ApiError::validation(message)
            }
            other => ApiError::ServiceUnavailable {
                message: "Credential verification is temporarily unavailable".to_string(),
                code: codes::dependency::REGISTRY_UNAVAILABLE,
                detail: other.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_error_mapping() {
        let cases = [
            (IdentityError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (IdentityError::InvalidSession, StatusCode::UNAUTHORIZED),
            (IdentityError::AccountSuspended, StatusCode::FORBIDDEN),
            (IdentityError::UidMismatch, StatusCode::FORBIDDEN),
            (IdentityError::EmailAlreadyInUse, StatusCode::BAD_REQUEST),
            (IdentityError::NotFound, StatusCode::NOT_FOUND),
            (
                IdentityError::VerificationUnavailable(RegistryError::Unavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                IdentityError::HashingError("argon2 exploded".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ApiError::from(IdentityError::HashingError("secret detail".into()));
        assert_eq!(err.to_string(), "Internal server error");

        let err = ApiError::from(IdentityError::StoreUnavailable("10.0.0.5 refused".into()));
        assert!(!err.to_string().contains("10.0.0.5"));
    }

    #[test]
    fn test_expired_token_has_own_code() {
        let err = ApiError::from(IdentityError::TokenExpired);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.error_code(), codes::authentication::TOKEN_EXPIRED);
    }

    #[test]
    fn test_verification_code_follows_role() {
        let err = ApiError::from(IdentityError::VerificationFailed {
            role: Role::Staff,
            message: "use your organization email address".into(),
        });
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.error_code(), codes::verification::STAFF_NOT_VERIFIED);
    }
}
