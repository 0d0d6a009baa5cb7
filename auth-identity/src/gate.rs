//! Credential gate applied before any doctor or staff account is created.

use crate::config::{VerificationConfig, VerificationMode};
use crate::error::{IdentityError, Result};
use crate::models::{Profile, Role};
use credential_registry::{ClaimedRole, DomainAllowList, StaffCheck, VerificationEngine};
use logger_redacted::redact_email;
use tracing::{info, warn};

#[derive(Clone)]
pub struct CredentialGate {
    engine: VerificationEngine,
    mode: VerificationMode,
    allow_list: DomainAllowList,
}

impl CredentialGate {
    pub fn new(engine: VerificationEngine, config: &VerificationConfig) -> Self {
        Self {
            engine,
            mode: config.mode,
            allow_list: config.allowed_domains.clone(),
        }
    }

    pub fn engine(&self) -> &VerificationEngine {
        &self.engine
    }

    pub fn mode(&self) -> VerificationMode {
        self.mode
    }

    /// `Ok(())` only on a positive decision. Patients always pass.
    pub async fn check(&self, email: &str, profile: &Profile) -> Result<()> {
        match (self.mode, profile) {
            (_, Profile::Patient(_)) => Ok(()),
            (_, Profile::Admin(_)) => Err(IdentityError::Forbidden(
                "Admin accounts cannot be created through signup".to_string(),
            )),
            (VerificationMode::Domain, Profile::Doctor(_)) => {
                self.check_domain(ClaimedRole::Doctor, Role::Doctor, email)
            }
            (VerificationMode::Domain, Profile::Staff(_)) => {
                self.check_domain(ClaimedRole::Staff, Role::Staff, email)
            }
            (VerificationMode::Registry, Profile::Doctor(doctor)) => {
                let verified = self
                    .engine
                    .verify_doctor(&doctor.license_number, &doctor.full_name, &doctor.medical_council)
                    .await
                    .map_err(|e| {
                        warn!(error = %e, "Credential registry unavailable during doctor check");
                        IdentityError::VerificationUnavailable(e)
                    })?;

                if verified {
                    info!(email = %redact_email(email), "Doctor credentials verified");
                    Ok(())
                } else {
                    info!(email = %redact_email(email), "Doctor credentials rejected");
                    Err(IdentityError::VerificationFailed {
                        role: Role::Doctor,
                        message: "Doctor verification failed: license number, full name and medical council must match the council registry exactly".to_string(),
                    })
                }
            }
            (VerificationMode::Registry, Profile::Staff(staff)) => {
                let check = self
                    .engine
                    .check_staff(email, &staff.organization_id, &staff.employee_id)
                    .await
                    .map_err(|e| {
                        warn!(error = %e, "Credential registry unavailable during staff check");
                        IdentityError::VerificationUnavailable(e)
                    })?;

                info!(
                    email = %redact_email(email),
                    organization_id = %staff.organization_id,
                    result = check.reason(),
                    "Staff credential check"
                );
                match check {
                    StaffCheck::Verified => Ok(()),
                    StaffCheck::OrganizationNotFound => Err(staff_failure(
                        "Staff verification failed: organization not found",
                    )),
                    StaffCheck::DomainNotAllowed => Err(staff_failure(
                        "Staff verification failed: use your organization email address",
                    )),
                    StaffCheck::EmployeeNotFound => Err(staff_failure(
                        "Staff verification failed: employee ID not found for this organization",
                    )),
                }
            }
        }
    }

    fn check_domain(&self, claimed: ClaimedRole, role: Role, email: &str) -> Result<()> {
        if self.allow_list.permits(claimed, email) {
            Ok(())
        } else {
            info!(email = %redact_email(email), %role, "Email domain not on allow-list");
            Err(IdentityError::VerificationFailed {
                role,
                message: format!("Email domain is not authorized for {} registration", role),
            })
        }
    }
}

fn staff_failure(message: &str) -> IdentityError {
    IdentityError::VerificationFailed {
        role: Role::Staff,
        message: message.to_string(),
    }
}
