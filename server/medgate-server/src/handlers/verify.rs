//! Direct credential checks against the registry.
//!
//! These endpoints never create accounts; they let clients validate doctor
//! and staff details before submitting a signup.

use crate::error::{ApiError, ApiResult};
use crate::server::MedGateServer;
use crate::validation::{require_fields, RequestValidation};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DoctorVerificationRequest {
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub medical_council: String,
}

impl RequestValidation for DoctorVerificationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_fields(&[
            ("license_number", self.license_number.as_str()),
            ("full_name", self.full_name.as_str()),
            ("medical_council", self.medical_council.as_str()),
        ])
    }
}

#[derive(Debug, Deserialize)]
pub struct StaffVerificationRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub employee_id: String,
}

impl RequestValidation for StaffVerificationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_fields(&[
            ("email", self.email.as_str()),
            ("organization_id", self.organization_id.as_str()),
            ("employee_id", self.employee_id.as_str()),
        ])
    }
}

#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// POST /verify/doctor
pub async fn verify_doctor(
    State(server): State<MedGateServer>,
    payload: Result<Json<DoctorVerificationRequest>, JsonRejection>,
) -> ApiResult<Json<VerificationResponse>> {
    let Json(request) = payload?;
    request.validate()?;

    let verified = server
        .verification
        .verify_doctor(&request.license_number, &request.full_name, &request.medical_council)
        .await?;
    Ok(Json(VerificationResponse {
        verified,
        reason: None,
    }))
}

/// POST /verify/staff
pub async fn verify_staff(
    State(server): State<MedGateServer>,
    payload: Result<Json<StaffVerificationRequest>, JsonRejection>,
) -> ApiResult<Json<VerificationResponse>> {
    let Json(request) = payload?;
    request.validate()?;

    let check = server
        .verification
        .check_staff(&request.email, &request.organization_id, &request.employee_id)
        .await?;
    Ok(Json(VerificationResponse {
        verified: check.is_verified(),
        reason: Some(check.reason()),
    }))
}
