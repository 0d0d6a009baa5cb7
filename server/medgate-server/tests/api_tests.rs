//! HTTP-level behaviour of the auth, verification and admin endpoints

mod common;

use axum::http::{Method, StatusCode};
use common::*;
use credential_registry::UnavailableRegistry;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_health_reports_stores() {
    let app = spawn_app().await;
    let (status, body) = app.send(json_request(Method::GET, "/api/v1/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["identity_store"], "healthy");
    assert_eq!(body["checks"]["credential_registry"], "healthy");
}

#[tokio::test]
async fn test_health_degraded_when_registry_down() {
    let app = spawn_app_with(Arc::new(UnavailableRegistry)).await;
    let (status, body) = app.send(json_request(Method::GET, "/api/v1/health", None, None)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["checks"]["credential_registry"], "unhealthy");
}

#[tokio::test]
async fn test_doctor_signup_pending() {
    let app = spawn_app().await;
    let (status, body) = app.signup(doctor_signup("john.smith@example.com")).await;

    assert_eq!(status, StatusCode::CREATED);
    let account = &body["account"];
    assert_eq!(account["status"], "pending_verification");
    assert_eq!(account["role"], "doctor");
    assert_eq!(account["profile"]["kind"], "doctor");
    assert_eq!(account["profile"]["verification_status"], "pending");
    assert_eq!(account["profile"]["specialization"], "General Medicine");
    assert!(account.get("password_hash").is_none());
}

#[tokio::test]
async fn test_staff_signup_succeeds() {
    let app = spawn_app().await;
    let (status, body) = app.signup(staff_signup("staff@cityhospital.com")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account"]["status"], "pending_verification");
    assert_eq!(body["account"]["profile"]["organization_id"], "ORG001");
}

#[tokio::test]
async fn test_staff_wrong_domain_rejected() {
    let app = spawn_app().await;
    let (status, body) = app.signup(staff_signup("asha@gmail.com")).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_type"], "verification_failed");
    assert!(body["error"].as_str().unwrap().contains("organization email"));
}

#[tokio::test]
async fn test_doctor_mismatch_rejected() {
    let app = spawn_app().await;
    let mut request = doctor_signup("john.smith@example.com");
    request["full_name"] = json!("Dr. Jon Smith");

    let (status, body) = app.signup(request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "VERIFY_4001");

    let (status, _) = app.login("john.smith@example.com", "doctor-pass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registry_outage_is_503_and_generic() {
    let app = spawn_app_with(Arc::new(UnavailableRegistry)).await;
    let (status, body) = app.signup(doctor_signup("john.smith@example.com")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error_type"], "service_unavailable");
    assert!(!body["error"].as_str().unwrap().contains("registry unavailable:"));

    // Patients do not depend on the registry
    let (status, _) = app.signup(patient_signup("jane@example.com")).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_validation_errors_are_itemized() {
    let app = spawn_app().await;
    let (status, body) = app
        .signup(json!({
            "email": "not-an-email",
            "password": "123",
            "role": "doctor",
            "full_name": ""
        }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
    let fields = &body["field_errors"];
    for field in ["email", "password", "full_name", "license_number", "medical_council"] {
        assert!(fields.get(field).is_some(), "missing field error for {}", field);
    }
    assert!(body["error_id"].is_string());
}

#[tokio::test]
async fn test_admin_role_cannot_sign_up() {
    let app = spawn_app().await;
    let mut request = patient_signup("root@example.com");
    request["role"] = json!("admin");

    let (status, body) = app.signup(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"].get("role").is_some());
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = spawn_app().await;
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/signup")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let app = spawn_app().await;
    assert_eq!(app.signup(patient_signup("jane@example.com")).await.0, StatusCode::CREATED);

    let (status, body) = app.signup(patient_signup("Jane@Example.com")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = spawn_app().await;
    app.signup(patient_signup("jane@example.com")).await;

    let (wrong_status, wrong_body) = app.login("jane@example.com", "not-the-password").await;
    let (unknown_status, unknown_body) = app.login("ghost@example.com", "secret1").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["error"], "Invalid credentials");
    assert_eq!(wrong_body["error"], unknown_body["error"]);
    assert_eq!(wrong_body["error_code"], unknown_body["error_code"]);
}

#[tokio::test]
async fn test_pending_doctor_cannot_log_in() {
    let app = spawn_app().await;
    app.signup(doctor_signup("john.smith@example.com")).await;

    let (status, body) = app.login("john.smith@example.com", "doctor-pass").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("pending verification"));
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = spawn_app().await;
    app.signup(patient_signup("jane@example.com")).await;

    let (status, login) = app.login("jane@example.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["token_type"], "Bearer");
    assert_eq!(login["expires_in"], 900);
    let access = login["access_token"].as_str().unwrap();
    let refresh = login["refresh_token"].as_str().unwrap();

    let (status, profile) = app.get_with_token("/api/v1/profile", access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "jane@example.com");
    assert_eq!(profile["profile"]["kind"], "patient");

    let (status, refreshed) = app
        .post("/api/v1/auth/refresh", json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(refreshed["access_token"].is_string());
    assert!(refreshed.get("refresh_token").is_none());

    let (status, _) = app
        .post("/api/v1/auth/logout", json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .post("/api/v1/auth/refresh", json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "authentication_error");

    // Logging out twice is harmless
    let (status, _) = app
        .post("/api/v1/auth/logout", json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_profile_requires_access_token() {
    let app = spawn_app().await;
    let (status, _) = app.send(json_request(Method::GET, "/api/v1/profile", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get_with_token("/api/v1/profile", "garbage").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_direct_verification_endpoints() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/api/v1/verify/doctor",
            json!({
                "license_number": " mh12345 ",
                "full_name": "Dr. John Smith",
                "medical_council": "Medical Council of India"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], true);

    let (status, body) = app
        .post(
            "/api/v1/verify/staff",
            json!({
                "email": "staff@cityhospital.com",
                "organization_id": "ORG001",
                "employee_id": "EMP404"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], false);
    assert_eq!(body["reason"], "employee not found in organization");

    let (status, body) = app.post("/api/v1/verify/staff", json!({ "email": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"].get("organization_id").is_some());
}

#[tokio::test]
async fn test_upload_then_admin_approval() {
    let app = spawn_app().await;
    let (_, signup) = app.signup(doctor_signup("john.smith@example.com")).await;
    let doctor_id = signup["account"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(multipart_request(
            &[("email", "john.smith@example.com"), ("password", "doctor-pass")],
            Some(("application/pdf", b"%PDF-1.4 license scan".as_slice())),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let stored = body["profile"]["verification_document"].as_str().unwrap().to_string();
    assert!(stored.ends_with(".pdf"));
    assert!(std::path::Path::new(&stored).starts_with(app.uploads.path()));

    let admin = app.admin_token().await;
    let (status, body) = app
        .send(json_request(
            Method::POST,
            &format!("/api/v1/admin/accounts/{}/verification", doctor_id),
            Some(json!({ "decision": "approve" })),
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
    assert_eq!(body["profile"]["verification_status"], "approved");

    let (status, _) = app.login("john.smith@example.com", "doctor-pass").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_rejections() {
    let app = spawn_app().await;
    app.signup(doctor_signup("john.smith@example.com")).await;

    let (status, _) = app
        .send(multipart_request(
            &[("email", "john.smith@example.com"), ("password", "doctor-pass")],
            Some(("text/plain", b"hello".as_slice())),
        ))
        .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let (status, _) = app
        .send(multipart_request(
            &[("email", "john.smith@example.com"), ("password", "doctor-pass")],
            Some(("image/png", [0u8; 2048].as_slice())),
        ))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, body) = app
        .send(multipart_request(
            &[("email", "john.smith@example.com"), ("password", "wrong-pass")],
            Some(("image/png", b"png".as_slice())),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    // Nothing is left behind for rejected uploads
    let leftover = std::fs::read_dir(app.uploads.path()).map(|d| d.count()).unwrap_or(0);
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn test_admin_endpoints_require_admin() {
    let app = spawn_app().await;
    app.signup(patient_signup("jane@example.com")).await;
    let (_, signup) = app.signup(doctor_signup("john.smith@example.com")).await;
    let doctor_id = signup["account"]["id"].as_str().unwrap().to_string();

    let (_, login) = app.login("jane@example.com", "secret1").await;
    let patient_token = login["access_token"].as_str().unwrap();

    let (status, _) = app
        .send(json_request(
            Method::POST,
            &format!("/api/v1/admin/accounts/{}/verification", doctor_id),
            Some(json!({ "decision": "approve" })),
            Some(patient_token),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_suspension_blocks_login() {
    let app = spawn_app().await;
    let (_, signup) = app.signup(patient_signup("jane@example.com")).await;
    let patient_id = signup["account"]["id"].as_str().unwrap().to_string();
    let admin = app.admin_token().await;

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/admin/accounts/{}/status", patient_id),
            Some(json!({ "status": "suspended" })),
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "suspended");

    let (status, body) = app.login("jane@example.com", "secret1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "AUTH_2004");

    let (status, _) = app
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/admin/accounts/{}/status", uuid::Uuid::new_v4()),
            Some(json!({ "status": "active" })),
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
