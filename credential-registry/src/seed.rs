//! Registry seed files (YAML or JSON).
//!
//! ```yaml
//! doctors:
//!   - license_number: MH12345
//!     full_name: Dr. John Smith
//!     medical_council: Medical Council of India
//! organizations:
//!   - id: ORG001
//!     name: City Hospital
//!     allowed_domains: [cityhospital.com]
//!     employees:
//!       - { employee_id: EMP001, email: staff@cityhospital.com, name: Asha Patel }
//! ```

use crate::{
    error::{RegistryError, Result},
    models::*,
    repository::CredentialRegistry,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySeed {
    #[serde(default)]
    pub doctors: Vec<DoctorRecord>,
    #[serde(default)]
    pub organizations: Vec<OrganizationSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSeed {
    #[serde(flatten)]
    pub organization: OrganizationRecord,
    #[serde(default)]
    pub employees: Vec<EmployeeRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub doctors: usize,
    pub organizations: usize,
    pub employees: usize,
}

impl RegistrySeed {
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        serde_yaml::from_str(input).map_err(|e| RegistryError::InvalidSeed(e.to_string()))
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| RegistryError::InvalidSeed(e.to_string()))
    }

    /// `.json` files are parsed as JSON, anything else as YAML
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
    }

    pub fn summary(&self) -> SeedSummary {
        SeedSummary {
            doctors: self.doctors.len(),
            organizations: self.organizations.len(),
            employees: self.organizations.iter().map(|o| o.employees.len()).sum(),
        }
    }

    /// Write every entry. Each organization is applied as one atomic batch;
    /// the first failure stops the run.
    pub async fn apply(self, registry: &dyn CredentialRegistry) -> Result<SeedSummary> {
        let summary = self.summary();

        registry.put_doctors(self.doctors).await?;
        for seed in self.organizations {
            registry
                .put_organization(seed.organization, seed.employees)
                .await?;
        }

        info!(
            doctors = summary.doctors,
            organizations = summary.organizations,
            employees = summary.employees,
            "Registry seed applied"
        );
        Ok(summary)
    }
}
