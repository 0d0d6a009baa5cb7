//! Credential verification against the registry.
//!
//! Both checks are read-only. A registry failure is returned as an error so
//! callers can tell "could not check" apart from "checked and rejected";
//! access control treats anything but `Ok(true)` as a denial.

use crate::{
    error::Result,
    models::normalize_license,
    repository::CredentialRegistry,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Outcome of a staff employment check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffCheck {
    Verified,
    OrganizationNotFound,
    DomainNotAllowed,
    EmployeeNotFound,
}

impl StaffCheck {
    pub fn is_verified(&self) -> bool {
        matches!(self, StaffCheck::Verified)
    }

    pub fn reason(&self) -> &'static str {
        match self {
            StaffCheck::Verified => "verified",
            StaffCheck::OrganizationNotFound => "organization not found",
            StaffCheck::DomainNotAllowed => "email domain not allowed for organization",
            StaffCheck::EmployeeNotFound => "employee not found in organization",
        }
    }
}

#[derive(Clone)]
pub struct VerificationEngine {
    registry: Arc<dyn CredentialRegistry>,
}

impl VerificationEngine {
    pub fn new(registry: Arc<dyn CredentialRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<dyn CredentialRegistry> {
        &self.registry
    }

    /// True iff a registry entry matches license, name and council exactly
    pub async fn verify_doctor(
        &self,
        license_number: &str,
        full_name: &str,
        medical_council: &str,
    ) -> Result<bool> {
        let license = normalize_license(license_number);
        let matches = self
            .registry
            .find_doctors(&license, full_name.trim(), medical_council)
            .await?;

        debug!(verified = !matches.is_empty(), "Doctor credential check");
        Ok(!matches.is_empty())
    }

    /// Organization exists, email domain is allowed, employee exists.
    /// Evaluated in that order; the first failing condition is reported.
    pub async fn check_staff(
        &self,
        email: &str,
        organization_id: &str,
        employee_id: &str,
    ) -> Result<StaffCheck> {
        let Some(organization) = self.registry.get_organization(organization_id).await? else {
            return Ok(StaffCheck::OrganizationNotFound);
        };

        let allowed = extract_domain(email)
            .map(|domain| organization.allows_domain(&domain))
            .unwrap_or(false);
        if !allowed {
            return Ok(StaffCheck::DomainNotAllowed);
        }

        let check = match self.registry.get_employee(organization_id, employee_id).await? {
            Some(_) => StaffCheck::Verified,
            None => StaffCheck::EmployeeNotFound,
        };
        debug!(organization_id, check = check.reason(), "Staff credential check");
        Ok(check)
    }

    pub async fn verify_staff(
        &self,
        email: &str,
        organization_id: &str,
        employee_id: &str,
    ) -> Result<bool> {
        Ok(self
            .check_staff(email, organization_id, employee_id)
            .await?
            .is_verified())
    }
}

/// Lower-cased part after the last `@`, if any
pub fn extract_domain(email: &str) -> Option<String> {
    email
        .trim()
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_lowercase())
        .filter(|domain| !domain.is_empty())
}

/// Role being claimed at signup, as far as credential gating is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimedRole {
    Patient,
    Doctor,
    Staff,
}

/// Simpler verification mode: per-role allow-listed email domains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainAllowList {
    pub doctor: Vec<String>,
    pub staff: Vec<String>,
}

impl DomainAllowList {
    pub fn permits(&self, role: ClaimedRole, email: &str) -> bool {
        let domains = match role {
            ClaimedRole::Patient => return true,
            ClaimedRole::Doctor => &self.doctor,
            ClaimedRole::Staff => &self.staff,
        };

        match extract_domain(email) {
            Some(domain) => domains
                .iter()
                .any(|allowed| allowed.trim().eq_ignore_ascii_case(&domain)),
            None => false,
        }
    }
}
