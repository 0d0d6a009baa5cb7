use crate::{
    error::{RegistryError, Result},
    models::*,
};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub mod postgres;

pub use postgres::PostgresCredentialRegistry;

/// Read access to the credential registry plus the administrative writes
/// used by seeding. Verification only ever calls the read methods.
#[async_trait]
pub trait CredentialRegistry: Send + Sync {
    /// Doctor records matching the exact (license, name, council) triple.
    /// Arguments are expected in normalized form.
    async fn find_doctors(
        &self,
        license_number: &str,
        full_name: &str,
        medical_council: &str,
    ) -> Result<Vec<DoctorRecord>>;

    async fn get_organization(&self, organization_id: &str) -> Result<Option<OrganizationRecord>>;

    /// Employee lookup scoped to one organization
    async fn get_employee(
        &self,
        organization_id: &str,
        employee_id: &str,
    ) -> Result<Option<EmployeeRecord>>;

    /// Insert or update doctor records, returning how many were written
    async fn put_doctors(&self, records: Vec<DoctorRecord>) -> Result<usize>;

    /// Insert or update an organization together with its employees (atomic)
    async fn put_organization(
        &self,
        organization: OrganizationRecord,
        employees: Vec<EmployeeRecord>,
    ) -> Result<()>;

    async fn is_healthy(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
struct OrganizationEntry {
    record: OrganizationRecord,
    employees: HashMap<String, EmployeeRecord>,
}

/// In-memory registry for testing and development
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialRegistry {
    doctors: Arc<DashMap<String, Vec<DoctorRecord>>>,
    organizations: Arc<DashMap<String, OrganizationEntry>>,
}

impl InMemoryCredentialRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialRegistry for InMemoryCredentialRegistry {
    async fn find_doctors(
        &self,
        license_number: &str,
        full_name: &str,
        medical_council: &str,
    ) -> Result<Vec<DoctorRecord>> {
        let matches = self
            .doctors
            .get(license_number)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.full_name == full_name && r.medical_council == medical_council)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(matches)
    }

    async fn get_organization(&self, organization_id: &str) -> Result<Option<OrganizationRecord>> {
        Ok(self
            .organizations
            .get(organization_id)
            .map(|entry| entry.record.clone()))
    }

    async fn get_employee(
        &self,
        organization_id: &str,
        employee_id: &str,
    ) -> Result<Option<EmployeeRecord>> {
        Ok(self
            .organizations
            .get(organization_id)
            .and_then(|entry| entry.employees.get(employee_id).cloned()))
    }

    async fn put_doctors(&self, records: Vec<DoctorRecord>) -> Result<usize> {
        let records = records
            .into_iter()
            .map(|record| {
                let record = record.normalized();
                record.validate().map(|_| record)
            })
            .collect::<Result<Vec<_>>>()?;

        let count = records.len();
        for record in records {
            let mut entry = self.doctors.entry(record.license_number.clone()).or_default();
            match entry.iter_mut().find(|existing| {
                existing.full_name == record.full_name
                    && existing.medical_council == record.medical_council
            }) {
                Some(existing) => *existing = record,
                None => entry.push(record),
            }
        }
        debug!(count, "Doctor records written");
        Ok(count)
    }

    async fn put_organization(
        &self,
        organization: OrganizationRecord,
        employees: Vec<EmployeeRecord>,
    ) -> Result<()> {
        let organization = organization.normalized();
        let employees: Vec<EmployeeRecord> = employees.into_iter().map(EmployeeRecord::normalized).collect();
        validate_organization(&organization, &employees)?;

        let incoming: HashMap<String, EmployeeRecord> = employees
            .into_iter()
            .map(|e| (e.employee_id.clone(), e))
            .collect();

        // The shard lock is held for the whole merge, so readers see either
        // the old organization or the complete new one.
        let organization_id = organization.id.clone();
        match self.organizations.entry(organization_id.clone()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.record = organization;
                entry.employees.extend(incoming);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(OrganizationEntry {
                    record: organization,
                    employees: incoming,
                });
            }
        }

        debug!(organization_id = %organization_id, "Organization written");
        Ok(())
    }
}

/// Registry that always fails, for exercising dependency-error paths
#[derive(Debug, Clone, Default)]
pub struct UnavailableRegistry;

#[async_trait]
impl CredentialRegistry for UnavailableRegistry {
    async fn find_doctors(&self, _: &str, _: &str, _: &str) -> Result<Vec<DoctorRecord>> {
        Err(RegistryError::Unavailable("registry offline".to_string()))
    }

    async fn get_organization(&self, _: &str) -> Result<Option<OrganizationRecord>> {
        Err(RegistryError::Unavailable("registry offline".to_string()))
    }

    async fn get_employee(&self, _: &str, _: &str) -> Result<Option<EmployeeRecord>> {
        Err(RegistryError::Unavailable("registry offline".to_string()))
    }

    async fn put_doctors(&self, _: Vec<DoctorRecord>) -> Result<usize> {
        Err(RegistryError::Unavailable("registry offline".to_string()))
    }

    async fn put_organization(&self, _: OrganizationRecord, _: Vec<EmployeeRecord>) -> Result<()> {
        Err(RegistryError::Unavailable("registry offline".to_string()))
    }

    async fn is_healthy(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor() -> DoctorRecord {
        DoctorRecord {
            license_number: "mh12345".to_string(),
            full_name: "Dr. John Smith".to_string(),
            medical_council: "Medical Council of India".to_string(),
            specialization: "Cardiology".to_string(),
            status: RecordStatus::Active,
        }
    }

    fn organization() -> OrganizationRecord {
        OrganizationRecord {
            id: "ORG001".to_string(),
            name: "City Hospital".to_string(),
            allowed_domains: ["cityhospital.com".to_string()].into_iter().collect(),
            status: RecordStatus::Active,
        }
    }

    fn employee(id: &str) -> EmployeeRecord {
        EmployeeRecord {
            employee_id: id.to_string(),
            email: "staff@cityhospital.com".to_string(),
            name: "Staff Member".to_string(),
            status: RecordStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_doctor_records_are_stored_normalized() {
        let repo = InMemoryCredentialRegistry::new();
        assert_eq!(repo.put_doctors(vec![doctor(), doctor()]).await.unwrap(), 2);

        let found = repo
            .find_doctors("MH12345", "Dr. John Smith", "Medical Council of India")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].specialization, "Cardiology");
    }

    #[tokio::test]
    async fn test_invalid_doctor_batch_writes_nothing() {
        let repo = InMemoryCredentialRegistry::new();
        let mut broken = doctor();
        broken.license_number = "MH99999".to_string();
        broken.full_name = "  ".to_string();

        assert!(repo.put_doctors(vec![doctor(), broken]).await.is_err());
        let found = repo
            .find_doctors("MH12345", "Dr. John Smith", "Medical Council of India")
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_employees_scoped_to_organization() {
        let repo = InMemoryCredentialRegistry::new();
        repo.put_organization(organization(), vec![employee("EMP001")])
            .await
            .unwrap();

        assert!(repo.get_employee("ORG001", "EMP001").await.unwrap().is_some());
        assert!(repo.get_employee("ORG002", "EMP001").await.unwrap().is_none());
        assert!(repo.get_employee("ORG001", "EMP002").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_padded_employee_ids_match_trimmed_lookups() {
        let repo = InMemoryCredentialRegistry::new();
        repo.put_organization(organization(), vec![employee(" EMP001 ")])
            .await
            .unwrap();

        assert!(repo.get_employee("ORG001", "EMP001").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rejected_organization_batch_is_not_partially_applied() {
        let repo = InMemoryCredentialRegistry::new();
        let result = repo
            .put_organization(organization(), vec![employee("EMP001"), employee("EMP001")])
            .await;

        assert!(result.is_err());
        assert!(repo.get_organization("ORG001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_registry_reports_errors() {
        let repo = UnavailableRegistry;
        assert!(!repo.is_healthy().await);
        let err = repo.get_organization("ORG001").await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
