//! PostgreSQL-backed credential registry
//!
//! Doctors live in `registry_doctors` keyed by the identity triple;
//! organizations and their employees in `registry_organizations` /
//! `registry_employees`. Organization batches are written in one transaction.

use crate::{
    error::{RegistryError, Result},
    models::*,
    repository::CredentialRegistry,
};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{debug, info};

/// PostgreSQL-backed credential registry
#[derive(Clone, Debug)]
pub struct PostgresCredentialRegistry {
    pool: PgPool,
}

impl PostgresCredentialRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn doctor_from_row(row: &PgRow) -> Result<DoctorRecord> {
        let status: String = row.try_get("status")?;
        Ok(DoctorRecord {
            license_number: row.try_get("license_number")?,
            full_name: row.try_get("full_name")?,
            medical_council: row.try_get("medical_council")?,
            specialization: row.try_get("specialization")?,
            status: status.parse()?,
        })
    }
}

#[async_trait]
impl CredentialRegistry for PostgresCredentialRegistry {
    async fn find_doctors(
        &self,
        license_number: &str,
        full_name: &str,
        medical_council: &str,
    ) -> Result<Vec<DoctorRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT license_number, full_name, medical_council, specialization, status
            FROM registry_doctors
            WHERE license_number = $1 AND full_name = $2 AND medical_council = $3
            "#,
        )
        .bind(license_number)
        .bind(full_name)
        .bind(medical_council)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RegistryError::Unavailable(format!("Failed to query doctors: {}", e)))?;

        rows.iter().map(Self::doctor_from_row).collect()
    }

    async fn get_organization(&self, organization_id: &str) -> Result<Option<OrganizationRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, allowed_domains, status
            FROM registry_organizations
            WHERE id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RegistryError::Unavailable(format!("Failed to query organization: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let domains: Vec<String> = row.try_get("allowed_domains")?;
        let status: String = row.try_get("status")?;
        Ok(Some(OrganizationRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            allowed_domains: domains.into_iter().collect(),
            status: status.parse()?,
        }))
    }

    async fn get_employee(
        &self,
        organization_id: &str,
        employee_id: &str,
    ) -> Result<Option<EmployeeRecord>> {
        let row = sqlx::query(
            r#"
            SELECT employee_id, email, name, status
            FROM registry_employees
            WHERE organization_id = $1 AND employee_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RegistryError::Unavailable(format!("Failed to query employee: {}", e)))?;

        row.map(|row| -> Result<EmployeeRecord> {
            let status: String = row.try_get("status")?;
            Ok(EmployeeRecord {
                employee_id: row.try_get("employee_id")?,
                email: row.try_get("email")?,
                name: row.try_get("name")?,
                status: status.parse()?,
            })
        })
        .transpose()
    }

    async fn put_doctors(&self, records: Vec<DoctorRecord>) -> Result<usize> {
        let records = records
            .into_iter()
            .map(|record| {
                let record = record.normalized();
                record.validate().map(|_| record)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut tx = self.pool.begin().await?;
        for record in &records {
            sqlx::query(
                r#"
                INSERT INTO registry_doctors (
                    license_number, full_name, medical_council, specialization, status
                ) VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (license_number, full_name, medical_council)
                DO UPDATE SET specialization = EXCLUDED.specialization, status = EXCLUDED.status
                "#,
            )
            .bind(&record.license_number)
            .bind(&record.full_name)
            .bind(&record.medical_council)
            .bind(&record.specialization)
            .bind(record.status.as_str())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!(count = records.len(), "Doctor records written");
        Ok(records.len())
    }

    async fn put_organization(
        &self,
        organization: OrganizationRecord,
        employees: Vec<EmployeeRecord>,
    ) -> Result<()> {
        let organization = organization.normalized();
        let employees: Vec<EmployeeRecord> = employees.into_iter().map(EmployeeRecord::normalized).collect();
        validate_organization(&organization, &employees)?;

        let domains: Vec<String> = organization.allowed_domains.iter().cloned().collect();

        // Dropping the transaction on any error rolls the whole batch back
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO registry_organizations (id, name, allowed_domains, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                allowed_domains = EXCLUDED.allowed_domains,
                status = EXCLUDED.status
            "#,
        )
        .bind(&organization.id)
        .bind(&organization.name)
        .bind(&domains)
        .bind(organization.status.as_str())
        .execute(&mut *tx)
        .await?;

        for employee in &employees {
            sqlx::query(
                r#"
                INSERT INTO registry_employees (organization_id, employee_id, email, name, status)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (organization_id, employee_id) DO UPDATE
                SET email = EXCLUDED.email, name = EXCLUDED.name, status = EXCLUDED.status
                "#,
            )
            .bind(&organization.id)
            .bind(&employee.employee_id)
            .bind(&employee.email)
            .bind(&employee.name)
            .bind(employee.status.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            organization_id = %organization.id,
            employees = employees.len(),
            "Organization written"
        );
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
