//! Verification engine behaviour against a seeded in-memory registry

use credential_registry::*;
use std::sync::Arc;

async fn seeded_engine() -> (VerificationEngine, Arc<InMemoryCredentialRegistry>) {
    let registry = Arc::new(InMemoryCredentialRegistry::new());
    let seed = RegistrySeed::from_path(concat!(env!("CARGO_MANIFEST_DIR"), "/seeds/dev.yaml"))
        .await
        .unwrap();
    seed.apply(registry.as_ref()).await.unwrap();
    (VerificationEngine::new(registry.clone()), registry)
}

#[tokio::test]
async fn test_doctor_exact_match_verifies() {
    let (engine, _) = seeded_engine().await;
    assert!(engine
        .verify_doctor("MH12345", "Dr. John Smith", "Medical Council of India")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_doctor_license_is_normalized_but_name_is_not_fuzzy() {
    let (engine, _) = seeded_engine().await;

    assert!(engine
        .verify_doctor(" mh12345 ", "  Dr. John Smith ", "Medical Council of India")
        .await
        .unwrap());
    assert!(!engine
        .verify_doctor("MH12345", "dr. john smith", "Medical Council of India")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_doctor_any_single_field_mismatch_fails() {
    let (engine, _) = seeded_engine().await;
    let cases = [
        ("MH12346", "Dr. John Smith", "Medical Council of India"),
        ("MH12345", "Dr. Jon Smith", "Medical Council of India"),
        ("MH12345", "Dr. John Smith", "Karnataka Medical Council"),
    ];
    for (license, name, council) in cases {
        assert!(
            !engine.verify_doctor(license, name, council).await.unwrap(),
            "{license}/{name}/{council} should not verify"
        );
    }
}

#[tokio::test]
async fn test_verification_is_pure_and_repeatable() {
    let (engine, registry) = seeded_engine().await;
    let before = registry.get_organization("ORG001").await.unwrap();

    for _ in 0..3 {
        assert!(engine
            .verify_staff("staff@cityhospital.com", "ORG001", "EMP001")
            .await
            .unwrap());
    }

    assert_eq!(registry.get_organization("ORG001").await.unwrap(), before);
}

#[tokio::test]
async fn test_staff_checks_report_first_failing_condition() {
    let (engine, _) = seeded_engine().await;

    assert_eq!(
        engine
            .check_staff("staff@cityhospital.com", "ORG001", "EMP001")
            .await
            .unwrap(),
        StaffCheck::Verified
    );
    assert_eq!(
        engine
            .check_staff("staff@cityhospital.com", "ORG404", "EMP001")
            .await
            .unwrap(),
        StaffCheck::OrganizationNotFound
    );
    // Valid employee, wrong domain
    assert_eq!(
        engine
            .check_staff("staff@gmail.com", "ORG001", "EMP001")
            .await
            .unwrap(),
        StaffCheck::DomainNotAllowed
    );
    assert_eq!(
        engine
            .check_staff("staff@CityHospital.com", "ORG001", "EMP999")
            .await
            .unwrap(),
        StaffCheck::EmployeeNotFound
    );
}

#[tokio::test]
async fn test_employee_of_another_organization_fails() {
    let (engine, _) = seeded_engine().await;
    assert!(!engine
        .verify_staff("frontdesk@sunriseclinic.in", "ORG001", "SC-100")
        .await
        .unwrap());
    assert!(engine
        .verify_staff("frontdesk@sunrise.health", "ORG002", "SC-100")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_registry_outage_is_an_error_not_a_rejection() {
    let engine = VerificationEngine::new(Arc::new(UnavailableRegistry));

    let doctor = engine
        .verify_doctor("MH12345", "Dr. John Smith", "Medical Council of India")
        .await;
    assert!(matches!(doctor, Err(RegistryError::Unavailable(_))));

    let staff = engine
        .check_staff("staff@cityhospital.com", "ORG001", "EMP001")
        .await;
    assert!(staff.unwrap_err().is_unavailable());
}

#[tokio::test]
async fn test_json_seed_file_loads_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.json");
    std::fs::write(
        &path,
        r#"{"doctors":[{"license_number":"DL55555","full_name":"Dr. Anil Mehta","medical_council":"Delhi Medical Council"}]}"#,
    )
    .unwrap();

    let registry = Arc::new(InMemoryCredentialRegistry::new());
    RegistrySeed::from_path(&path)
        .await
        .unwrap()
        .apply(registry.as_ref())
        .await
        .unwrap();

    let engine = VerificationEngine::new(registry);
    assert!(engine
        .verify_doctor("dl55555", "Dr. Anil Mehta", "Delhi Medical Council")
        .await
        .unwrap());
}
