#![allow(dead_code)]

use auth_identity::*;
use credential_registry::{
    DoctorRecord, EmployeeRecord, InMemoryCredentialRegistry, OrganizationRecord, RecordStatus,
    VerificationEngine,
};
use std::sync::Arc;

pub const ADMIN_EMAIL: &str = "admin@medgate.dev";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct Harness {
    pub service: AuthService,
    pub store: Arc<InMemoryIdentityStore>,
    pub registry: Arc<InMemoryCredentialRegistry>,
    pub gate: CredentialGate,
}

pub async fn seeded_registry() -> Arc<InMemoryCredentialRegistry> {
    let registry = Arc::new(InMemoryCredentialRegistry::new());
    credential_registry::CredentialRegistry::put_doctors(
        registry.as_ref(),
        vec![DoctorRecord {
            license_number: "MH12345".to_string(),
            full_name: "Dr. John Smith".to_string(),
            medical_council: "Medical Council of India".to_string(),
            specialization: "Cardiology".to_string(),
            status: RecordStatus::Active,
        }],
    )
    .await
    .unwrap();
    credential_registry::CredentialRegistry::put_organization(
        registry.as_ref(),
        OrganizationRecord {
            id: "ORG001".to_string(),
            name: "City Hospital".to_string(),
            allowed_domains: ["cityhospital.com".to_string()].into_iter().collect(),
            status: RecordStatus::Active,
        },
        vec![EmployeeRecord {
            employee_id: "EMP001".to_string(),
            email: "staff@cityhospital.com".to_string(),
            name: "Asha Patel".to_string(),
            status: RecordStatus::Active,
        }],
    )
    .await
    .unwrap();
    registry
}

pub async fn harness_with(verification: VerificationConfig) -> Harness {
    let registry = seeded_registry().await;
    let store = Arc::new(InMemoryIdentityStore::new());
    let gate = CredentialGate::new(VerificationEngine::new(registry.clone()), &verification);
    let service = AuthService::new(
        store.clone(),
        gate.clone(),
        PasswordManager::new(&PasswordConfig::fast()).unwrap(),
        TokenService::new(TokenConfig::default()).unwrap(),
    );
    Harness {
        service,
        store,
        registry,
        gate,
    }
}

pub async fn harness() -> Harness {
    harness_with(VerificationConfig::default()).await
}

pub fn patient_signup(email: &str, password: &str) -> SignupRequest {
    SignupRequest {
        email: email.to_string(),
        password: password.to_string(),
        role: Role::Patient,
        fields: ProfileFields {
            full_name: "Jane Doe".to_string(),
            ..Default::default()
        },
        verification_document: None,
    }
}

pub fn doctor_fields() -> ProfileFields {
    ProfileFields {
        full_name: "Dr. John Smith".to_string(),
        license_number: Some("MH12345".to_string()),
        medical_council: Some("Medical Council of India".to_string()),
        ..Default::default()
    }
}

pub fn doctor_signup(email: &str) -> SignupRequest {
    SignupRequest {
        email: email.to_string(),
        password: "doctor-pass".to_string(),
        role: Role::Doctor,
        fields: doctor_fields(),
        verification_document: None,
    }
}

pub fn staff_fields() -> ProfileFields {
    ProfileFields {
        full_name: "Asha Patel".to_string(),
        organization_id: Some("ORG001".to_string()),
        employee_id: Some("EMP001".to_string()),
        department: Some("Radiology".to_string()),
        ..Default::default()
    }
}

pub fn staff_signup(email: &str) -> SignupRequest {
    SignupRequest {
        email: email.to_string(),
        password: "staff-pass".to_string(),
        role: Role::Staff,
        fields: staff_fields(),
        verification_document: None,
    }
}
