//! Reconciles principals authenticated by the external identity provider
//! with the local identity store.
//!
//! Reconciliation is an idempotent upsert keyed by the external UID; the
//! local store stays the single source of truth for account status.

use crate::{
    error::*,
    external::{ExternalPrincipal, ExternalTokenVerifier},
    gate::CredentialGate,
    models::*,
    repository::IdentityStore,
    service::load_profile,
    validation::{normalize_email, validate_identity},
};
use logger_redacted::redact_email;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct IdentityBridge {
    store: Arc<dyn IdentityStore>,
    gate: CredentialGate,
    verifier: Arc<dyn ExternalTokenVerifier>,
}

impl IdentityBridge {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        gate: CredentialGate,
        verifier: Arc<dyn ExternalTokenVerifier>,
    ) -> Self {
        Self { store, gate, verifier }
    }

    /// Verify an external bearer token
    pub async fn authenticate(&self, token: &str) -> Result<ExternalPrincipal> {
        self.verifier.verify(token).await
    }

    /// Return the account linked to the principal, creating it on first sight
    #[instrument(skip_all, fields(role = %request.role))]
    pub async fn sync_external_user(
        &self,
        principal: &ExternalPrincipal,
        request: ExternalSyncRequest,
    ) -> Result<AccountView> {
        if request.external_uid != principal.uid {
            warn!("External UID in request does not match verified token");
            return Err(IdentityError::UidMismatch);
        }

        // The token's verified-email claim only vouches for its own address
        let token_email = principal.email.as_deref().map(normalize_email);
        if let Some(token_email) = &token_email {
            if *token_email != normalize_email(&request.email) {
                warn!("Email in request does not match verified token");
                return Err(IdentityError::Forbidden(
                    "Email does not match the authenticated identity".to_string(),
                ));
            }
        }

        if let Some(existing) = self.store.find_account_by_external_uid(&principal.uid).await? {
            return self.view(existing).await;
        }

        let (email, profile) = validate_identity(&request.email, request.role, &request.fields, None)?;

        if self.store.find_account_by_email(&email).await?.is_some() {
            return Err(IdentityError::EmailAlreadyInUse);
        }

        self.gate.check(&email, &profile).await?;

        let email_verified = principal.email_verified && token_email.as_deref() == Some(email.as_str());
        let mut account = Account::new(email, request.role, None);
        account.external_uid = Some(principal.uid.clone());
        account.email_verified = email_verified;

        match self.store.create_account(&account, &profile).await {
            Ok(()) => {
                info!(
                    account_id = %account.id,
                    email = %redact_email(&account.email),
                    status = %account.status,
                    "External account provisioned"
                );
                Ok(AccountView::new(account, profile))
            }
            Err(e @ (IdentityError::ExternalUidAlreadyLinked | IdentityError::EmailAlreadyInUse)) => {
                // A concurrent sync for the same UID may have won the insert
                match self.store.find_account_by_external_uid(&principal.uid).await? {
                    Some(winner) => self.view(winner).await,
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Account and profile for an external UID
    pub async fn get_profile(&self, external_uid: &str) -> Result<AccountView> {
        let account = self
            .store
            .find_account_by_external_uid(external_uid)
            .await?
            .ok_or(IdentityError::NotFound)?;
        self.view(account).await
    }

    async fn view(&self, account: Account) -> Result<AccountView> {
        let profile = load_profile(self.store.as_ref(), &account).await?;
        Ok(AccountView::new(account, profile))
    }
}
