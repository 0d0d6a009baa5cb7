//! PostgreSQL-backed identity store
//!
//! Profiles are stored as JSONB next to a `kind` column mirroring the
//! account role. Account and profile rows are written in one transaction.

use crate::{error::*, models::*, repository::IdentityStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database_layer::violated_constraint;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use tracing::{debug, error};
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, role, email_verified, external_uid, \
     status, created_at, updated_at, last_login_at";

#[derive(Clone, Debug)]
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn account_from_row(row: &PgRow) -> Result<Account> {
        let role: String = row.try_get("role")?;
        let status: String = row.try_get("status")?;
        Ok(Account {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: Role::parse(&role).ok_or_else(|| {
                IdentityError::InternalError(anyhow::anyhow!("unknown role '{}' in accounts", role))
            })?,
            email_verified: row.try_get("email_verified")?,
            external_uid: row.try_get("external_uid")?,
            status: AccountStatus::parse(&status).ok_or_else(|| {
                IdentityError::InternalError(anyhow::anyhow!("unknown status '{}' in accounts", status))
            })?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            last_login_at: row.try_get("last_login_at")?,
        })
    }

    fn session_from_row(row: &PgRow) -> Result<Session> {
        Ok(Session {
            id: row.try_get("id")?,
            account_id: row.try_get("account_id")?,
            token_hash: row.try_get("token_hash")?,
            expires_at: row.try_get("expires_at")?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn find_account_where(&self, column: &str, value: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE {} = $1", ACCOUNT_COLUMNS, column);
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::account_from_row).transpose()
    }
}

fn map_insert_error(e: sqlx::Error) -> IdentityError {
    match violated_constraint(&e).as_deref() {
        Some("accounts_email_key") => IdentityError::EmailAlreadyInUse,
        Some("accounts_external_uid_key") => IdentityError::ExternalUidAlreadyLinked,
        _ => {
            error!("Failed to create account: {}", e);
            IdentityError::DatabaseError(e)
        }
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn create_account(&self, account: &Account, profile: &Profile) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, email, password_hash, role, email_verified, external_uid,
                status, created_at, updated_at, last_login_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.email_verified)
        .bind(&account.external_uid)
        .bind(account.status.as_str())
        .bind(account.created_at)
        .bind(account.updated_at)
        .bind(account.last_login_at)
        .execute(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        sqlx::query("INSERT INTO profiles (account_id, kind, data) VALUES ($1, $2, $3)")
            .bind(account.id)
            .bind(profile.role().as_str())
            .bind(Json(profile))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(account_id = %account.id, role = %account.role, "Account created");
        Ok(())
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(Self::account_from_row).transpose()
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.find_account_where("email", email).await
    }

    async fn find_account_by_external_uid(&self, external_uid: &str) -> Result<Option<Account>> {
        self.find_account_where("external_uid", external_uid).await
    }

    async fn get_profile(&self, account_id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT data FROM profiles WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<Profile> {
            let Json(profile): Json<Profile> = row.try_get("data")?;
            Ok(profile)
        })
        .transpose()
    }

    async fn update_profile(&self, account_id: Uuid, profile: &Profile) -> Result<()> {
        let result = sqlx::query(
            "UPDATE profiles SET data = $2, updated_at = NOW() WHERE account_id = $1",
        )
        .bind(account_id)
        .bind(Json(profile))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::NotFound);
        }
        Ok(())
    }

    async fn update_account_status(&self, account_id: Uuid, status: AccountStatus) -> Result<()> {
        let result = sqlx::query("UPDATE accounts SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(account_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::NotFound);
        }
        Ok(())
    }

    async fn save_review(&self, account_id: Uuid, profile: &Profile, status: AccountStatus) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE accounts SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(account_id)
            .bind(status.as_str())
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(IdentityError::NotFound);
        }

        sqlx::query("UPDATE profiles SET data = $2, updated_at = NOW() WHERE account_id = $1")
            .bind(account_id)
            .bind(Json(profile))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn record_login(&self, account_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE accounts SET last_login_at = $2 WHERE id = $1")
            .bind(account_id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, account_id, token_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.id)
        .bind(session.account_id)
        .bind(&session.token_hash)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            "SELECT id, account_id, token_hash, expires_at, created_at FROM sessions WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::session_from_row).transpose()
    }

    async fn delete_session(&self, token_hash: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_sessions(&self, account_id: Uuid) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE account_id = $1")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
