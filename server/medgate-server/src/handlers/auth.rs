use crate::error::{ApiError, ApiResult};
use crate::server::MedGateServer;
use crate::validation::{require_fields, RequestValidation};
use auth_identity::{AccessTokenResponse, AccountView, LoginResponse, SignupRequest};
use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RequestValidation for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_fields(&[("email", self.email.as_str()), ("password", self.password.as_str())])
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

impl RequestValidation for RefreshRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_fields(&[("refresh_token", self.refresh_token.as_str())])
    }
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub account: AccountView,
}

/// POST /auth/signup
pub async fn signup(
    State(server): State<MedGateServer>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let Json(request) = payload?;
    let account = server.auth.signup(request).await?;

    let message = if account.role.requires_verification() {
        "Account created. Upload a verification document and wait for admin approval"
    } else {
        "Account created"
    };
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: message.to_string(),
            account,
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(server): State<MedGateServer>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;
    request.validate()?;
    Ok(Json(server.auth.login(&request.email, &request.password).await?))
}

/// POST /auth/refresh
pub async fn refresh(
    State(server): State<MedGateServer>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<AccessTokenResponse>> {
    let Json(request) = payload?;
    request.validate()?;
    Ok(Json(server.auth.refresh(&request.refresh_token).await?))
}

/// POST /auth/logout; succeeds for unknown sessions too
pub async fn logout(
    State(server): State<MedGateServer>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = payload?;
    request.validate()?;
    server.auth.logout(&request.refresh_token).await;
    Ok(StatusCode::NO_CONTENT)
}

struct UploadForm {
    email: String,
    password: String,
    document: Option<(String, Vec<u8>)>,
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge {
            message: "Document exceeds the upload size limit".to_string(),
        }
    } else {
        ApiError::validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

async fn read_upload_form(server: &MedGateServer, mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm {
        email: String::new(),
        password: String::new(),
        document: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("email") => form.email = field.text().await.map_err(multipart_error)?,
            Some("password") => form.password = field.text().await.map_err(multipart_error)?,
            Some("document") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                // Reject the type before buffering the body
                server.documents.check(&content_type, 1)?;
                let data = field.bytes().await.map_err(multipart_error)?;
                form.document = Some((content_type, data.to_vec()));
            }
            _ => {}
        }
    }
    Ok(form)
}

/// POST /auth/upload-verification (multipart: email, password, document)
pub async fn upload_verification(
    State(server): State<MedGateServer>,
    multipart: Multipart,
) -> ApiResult<Json<AccountView>> {
    let form = read_upload_form(&server, multipart).await?;
    require_fields(&[("email", form.email.as_str()), ("password", form.password.as_str())])?;
    let (content_type, data) = form
        .document
        .ok_or_else(|| ApiError::field("document", "document is required"))?;

    let stored_path = server.documents.store(&content_type, &data).await?;
    match server
        .auth
        .attach_verification_document(&form.email, &form.password, &stored_path)
        .await
    {
        Ok(view) => {
            info!(account_id = %view.id, "Verification document uploaded");
            Ok(Json(view))
        }
        Err(e) => {
            server.documents.discard(&stored_path).await;
            Err(e.into())
        }
    }
}
