use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;

/// Administrative state of a registry entry.
///
/// Carried for administration only; verification matches on identity
/// attributes and never consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RecordStatus::Active),
            "inactive" => Ok(RecordStatus::Inactive),
            other => Err(RegistryError::InvalidRecord(format!(
                "unknown record status '{}'",
                other
            ))),
        }
    }
}

/// A licensed practitioner as published by a medical council
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub license_number: String,
    pub full_name: String,
    pub medical_council: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub status: RecordStatus,
}

impl DoctorRecord {
    /// Canonical form used for storage and lookup: license upper-cased and
    /// trimmed, name trimmed. The council is kept exactly as given.
    pub fn normalized(mut self) -> Self {
        self.license_number = normalize_license(&self.license_number);
        self.full_name = self.full_name.trim().to_string();
        self
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.license_number.trim().is_empty() {
            return Err(RegistryError::InvalidRecord(
                "doctor license_number must not be empty".to_string(),
            ));
        }
        if self.full_name.trim().is_empty() {
            return Err(RegistryError::InvalidRecord(format!(
                "doctor {} has no full_name",
                self.license_number
            )));
        }
        if self.medical_council.is_empty() {
            return Err(RegistryError::InvalidRecord(format!(
                "doctor {} has no medical_council",
                self.license_number
            )));
        }
        Ok(())
    }
}

/// An employing organization and the email domains its staff sign up with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub allowed_domains: BTreeSet<String>,
    #[serde(default)]
    pub status: RecordStatus,
}

impl OrganizationRecord {
    /// Domains are stored lower-cased so membership is case-insensitive
    pub fn normalized(mut self) -> Self {
        self.id = self.id.trim().to_string();
        self.allowed_domains = self
            .allowed_domains
            .iter()
            .map(|domain| domain.trim().to_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect();
        self
    }

    pub fn allows_domain(&self, domain: &str) -> bool {
        let domain = domain.to_lowercase();
        self.allowed_domains
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&domain))
    }
}

/// A member of an organization, keyed by `employee_id` within it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub status: RecordStatus,
}

impl EmployeeRecord {
    /// Ids are matched exactly, so surrounding whitespace is dropped on write
    pub fn normalized(mut self) -> Self {
        self.employee_id = self.employee_id.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }
}

pub fn normalize_license(license_number: &str) -> String {
    license_number.trim().to_uppercase()
}

/// Reject an organization batch before anything is written
pub fn validate_organization(
    organization: &OrganizationRecord,
    employees: &[EmployeeRecord],
) -> Result<(), RegistryError> {
    if organization.id.trim().is_empty() {
        return Err(RegistryError::InvalidRecord(
            "organization id must not be empty".to_string(),
        ));
    }
    if organization.name.trim().is_empty() {
        return Err(RegistryError::InvalidRecord(format!(
            "organization {} has no name",
            organization.id
        )));
    }

    let mut seen = BTreeSet::new();
    for employee in employees {
        if employee.employee_id.trim().is_empty() {
            return Err(RegistryError::InvalidRecord(format!(
                "organization {} has an employee without employee_id",
                organization.id
            )));
        }
        if !seen.insert(employee.employee_id.as_str()) {
            return Err(RegistryError::InvalidRecord(format!(
                "duplicate employee_id {} in organization {}",
                employee.employee_id, organization.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(domains: &[&str]) -> OrganizationRecord {
        OrganizationRecord {
            id: " ORG001 ".to_string(),
            name: "City Hospital".to_string(),
            allowed_domains: domains.iter().map(|d| d.to_string()).collect(),
            status: RecordStatus::Active,
        }
    }

    fn employee(id: &str) -> EmployeeRecord {
        EmployeeRecord {
            employee_id: id.to_string(),
            email: format!("{}@cityhospital.com", id.to_lowercase()),
            name: "Staff Member".to_string(),
            status: RecordStatus::Active,
        }
    }

    #[test]
    fn test_doctor_normalization_keeps_council() {
        let record = DoctorRecord {
            license_number: " mh12345 ".to_string(),
            full_name: " Dr. John Smith ".to_string(),
            medical_council: "Medical Council of India".to_string(),
            specialization: String::new(),
            status: RecordStatus::Active,
        }
        .normalized();

        assert_eq!(record.license_number, "MH12345");
        assert_eq!(record.full_name, "Dr. John Smith");
        assert_eq!(record.medical_council, "Medical Council of India");
    }

    #[test]
    fn test_organization_domains_are_case_insensitive() {
        let record = org(&["CityHospital.com", " "]).normalized();
        assert_eq!(record.id, "ORG001");
        assert_eq!(record.allowed_domains.len(), 1);
        assert!(record.allows_domain("CITYHOSPITAL.COM"));
        assert!(!record.allows_domain("gmail.com"));
    }

    #[test]
    fn test_employee_ids_are_trimmed() {
        let record = employee(" EMP001 ").normalized();
        assert_eq!(record.employee_id, "EMP001");
    }

    #[test]
    fn test_duplicate_employee_ids_rejected() {
        let result = validate_organization(&org(&[]), &[employee("EMP001"), employee("EMP001")]);
        assert!(matches!(result, Err(RegistryError::InvalidRecord(_))));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("inactive".parse::<RecordStatus>().unwrap(), RecordStatus::Inactive);
        assert!("retired".parse::<RecordStatus>().is_err());
    }
}
