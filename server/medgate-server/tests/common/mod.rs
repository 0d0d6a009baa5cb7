#![allow(dead_code)]

use auth_identity::{ExternalAuthConfig, ExternalTokenVerifier, InMemoryIdentityStore, JwtExternalVerifier};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use credential_registry::{CredentialRegistry, InMemoryCredentialRegistry, RegistrySeed};
use medgate_server::{create_app, AppConfig, MedGateServer};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const EXTERNAL_SECRET: &str = "test-external-secret";
pub const EXTERNAL_ISSUER: &str = "https://idp.example.com";
pub const ADMIN_EMAIL: &str = "admin@medgate.dev";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct TestApp {
    pub app: Router,
    pub server: MedGateServer,
    pub store: Arc<InMemoryIdentityStore>,
    pub uploads: TempDir,
}

pub fn test_config(uploads: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.password = auth_identity::PasswordConfig::fast();
    config.uploads.directory = uploads.path().to_path_buf();
    config.uploads.max_bytes = 1024;
    config.external = ExternalAuthConfig {
        issuer: Some(EXTERNAL_ISSUER.to_string()),
        audience: None,
        hs256_secret: Some(EXTERNAL_SECRET.to_string()),
        rs256_public_key_pem: None,
    };
    config
}

pub async fn seeded_registry() -> Arc<InMemoryCredentialRegistry> {
    let seed_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../credential-registry/seeds/dev.yaml");
    let registry = Arc::new(InMemoryCredentialRegistry::new());
    RegistrySeed::from_path(seed_path)
        .await
        .unwrap()
        .apply(registry.as_ref())
        .await
        .unwrap();
    registry
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(seeded_registry().await).await
}

pub async fn spawn_app_with(registry: Arc<dyn CredentialRegistry>) -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let config = test_config(&uploads);
    let store = Arc::new(InMemoryIdentityStore::new());
    let verifier: Arc<dyn ExternalTokenVerifier> =
        Arc::new(JwtExternalVerifier::from_config(&config.external).unwrap());

    let server = MedGateServer::with_components(store.clone(), registry, Some(verifier), &config).unwrap();
    TestApp {
        app: create_app(server.clone()),
        server,
        store,
        uploads,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(Method::POST, uri, Some(body), None)).await
    }

    pub async fn get_with_token(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(json_request(Method::GET, uri, None, Some(token))).await
    }

    pub async fn signup(&self, body: Value) -> (StatusCode, Value) {
        self.post("/api/v1/auth/signup", body).await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post("/api/v1/auth/login", json!({ "email": email, "password": password }))
            .await
    }

    /// Access token for the bootstrap administrator
    pub async fn admin_token(&self) -> String {
        self.server
            .auth
            .provision_admin(ADMIN_EMAIL, ADMIN_PASSWORD, "Root Admin")
            .await
            .unwrap();
        let (status, body) = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }
}

pub fn json_request(method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn patient_signup(email: &str) -> Value {
    json!({
        "email": email,
        "password": "secret1",
        "role": "patient",
        "full_name": "Jane Doe",
        "phone": "+91 98765 43210"
    })
}

pub fn doctor_signup(email: &str) -> Value {
    json!({
        "email": email,
        "password": "doctor-pass",
        "role": "doctor",
        "full_name": "Dr. John Smith",
        "license_number": "MH12345",
        "medical_council": "Medical Council of India"
    })
}

pub fn staff_signup(email: &str) -> Value {
    json!({
        "email": email,
        "password": "staff-pass",
        "role": "staff",
        "full_name": "Asha Patel",
        "organization_id": "ORG001",
        "employee_id": "EMP001",
        "department": "Radiology"
    })
}

/// HS256 token as the external provider would mint it
pub fn external_token(uid: &str, email: &str) -> String {
    let claims = json!({
        "sub": uid,
        "email": email,
        "email_verified": true,
        "iss": EXTERNAL_ISSUER,
        "exp": chrono::Utc::now().timestamp() + 600,
    });
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(EXTERNAL_SECRET.as_bytes()),
    )
    .unwrap()
}

pub const BOUNDARY: &str = "medgate-test-boundary";

/// multipart/form-data body with text fields and one file part
pub fn multipart_request(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"document\"; filename=\"license\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/upload-verification")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
