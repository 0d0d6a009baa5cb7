use crate::{error::*, models::*};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub mod postgres;

pub use postgres::PostgresIdentityStore;

/// Accounts, profiles and sessions.
///
/// Uniqueness of email and external UID is enforced here, not by callers:
/// `create_account` fails with `EmailAlreadyInUse` or
/// `ExternalUidAlreadyLinked` when it loses a race.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Persist an account together with its profile (atomic)
    async fn create_account(&self, account: &Account, profile: &Profile) -> Result<()>;

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    /// `email` must already be normalized
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn find_account_by_external_uid(&self, external_uid: &str) -> Result<Option<Account>>;

    async fn get_profile(&self, account_id: Uuid) -> Result<Option<Profile>>;

    async fn update_profile(&self, account_id: Uuid, profile: &Profile) -> Result<()>;

    async fn update_account_status(&self, account_id: Uuid, status: AccountStatus) -> Result<()>;

    /// Store a reviewed profile and the resulting account status (atomic)
    async fn save_review(&self, account_id: Uuid, profile: &Profile, status: AccountStatus) -> Result<()>;

    async fn record_login(&self, account_id: Uuid, at: DateTime<Utc>) -> Result<()>;

    async fn create_session(&self, session: &Session) -> Result<()>;

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>>;

    /// Returns whether a session was removed
    async fn delete_session(&self, token_hash: &str) -> Result<bool>;

    async fn count_sessions(&self, account_id: Uuid) -> Result<usize>;

    async fn is_healthy(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct IdentityState {
    accounts: HashMap<Uuid, Account>,
    by_email: HashMap<String, Uuid>,
    by_external_uid: HashMap<String, Uuid>,
    profiles: HashMap<Uuid, Profile>,
    sessions: HashMap<String, Session>,
}

/// In-memory identity store for testing and development.
///
/// One lock guards every table so multi-table writes are atomic.
#[derive(Clone, Default)]
pub struct InMemoryIdentityStore {
    state: Arc<RwLock<IdentityState>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn create_account(&self, account: &Account, profile: &Profile) -> Result<()> {
        let mut state = self.state.write();

        if let Some(uid) = &account.external_uid {
            if state.by_external_uid.contains_key(uid) {
                return Err(IdentityError::ExternalUidAlreadyLinked);
            }
        }
        if state.by_email.contains_key(&account.email) {
            return Err(IdentityError::EmailAlreadyInUse);
        }

        if let Some(uid) = &account.external_uid {
            state.by_external_uid.insert(uid.clone(), account.id);
        }

        state.by_email.insert(account.email.clone(), account.id);
        state.profiles.insert(account.id, profile.clone());
        state.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.state.read().accounts.get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let state = self.state.read();
        Ok(state
            .by_email
            .get(email)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn find_account_by_external_uid(&self, external_uid: &str) -> Result<Option<Account>> {
        let state = self.state.read();
        Ok(state
            .by_external_uid
            .get(external_uid)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn get_profile(&self, account_id: Uuid) -> Result<Option<Profile>> {
        Ok(self.state.read().profiles.get(&account_id).cloned())
    }

    async fn update_profile(&self, account_id: Uuid, profile: &Profile) -> Result<()> {
        let mut state = self.state.write();
        if !state.accounts.contains_key(&account_id) {
            return Err(IdentityError::NotFound);
        }
        state.profiles.insert(account_id, profile.clone());
        if let Some(account) = state.accounts.get_mut(&account_id) {
            account.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_account_status(&self, account_id: Uuid, status: AccountStatus) -> Result<()> {
        let mut state = self.state.write();
        let account = state.accounts.get_mut(&account_id).ok_or(IdentityError::NotFound)?;
        account.status = status;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn save_review(&self, account_id: Uuid, profile: &Profile, status: AccountStatus) -> Result<()> {
        let mut state = self.state.write();
        let account = state.accounts.get_mut(&account_id).ok_or(IdentityError::NotFound)?;
        account.status = status;
        account.updated_at = Utc::now();
        state.profiles.insert(account_id, profile.clone());
        Ok(())
    }

    async fn record_login(&self, account_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.write();
        let account = state.accounts.get_mut(&account_id).ok_or(IdentityError::NotFound)?;
        account.last_login_at = Some(at);
        Ok(())
    }

    async fn create_session(&self, session: &Session) -> Result<()> {
        let mut state = self.state.write();
        if !state.accounts.contains_key(&session.account_id) {
            return Err(IdentityError::NotFound);
        }
        state.sessions.insert(session.token_hash.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>> {
        Ok(self.state.read().sessions.get(token_hash).cloned())
    }

    async fn delete_session(&self, token_hash: &str) -> Result<bool> {
        Ok(self.state.write().sessions.remove(token_hash).is_some())
    }

    async fn count_sessions(&self, account_id: Uuid) -> Result<usize> {
        Ok(self
            .state
            .read()
            .sessions
            .values()
            .filter(|s| s.account_id == account_id)
            .count())
    }
}
