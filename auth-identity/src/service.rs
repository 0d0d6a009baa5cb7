use crate::{
    error::*,
    gate::CredentialGate,
    models::*,
    password::PasswordManager,
    repository::IdentityStore,
    tokens::{hash_refresh_token, AccessClaims, TokenService},
    validation::{normalize_email, validate_identity},
};
use chrono::Utc;
use logger_redacted::redact_email;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const TOKEN_TYPE: &str = "Bearer";

/// Password signup, login, session refresh and the admin review workflow
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn IdentityStore>,
    gate: CredentialGate,
    passwords: PasswordManager,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        gate: CredentialGate,
        passwords: PasswordManager,
        tokens: TokenService,
    ) -> Self {
        Self {
            store,
            gate,
            passwords,
            tokens,
        }
    }

    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        &self.store
    }

    pub fn gate(&self) -> &CredentialGate {
        &self.gate
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Validate, gate, hash and persist. Nothing is written unless every
    /// step succeeds.
    #[instrument(skip_all, fields(role = %request.role))]
    pub async fn signup(&self, request: SignupRequest) -> Result<AccountView> {
        let (email, mut profile) = validate_identity(
            &request.email,
            request.role,
            &request.fields,
            Some((&request.password, self.passwords.min_length())),
        )?;

        if self.store.find_account_by_email(&email).await?.is_some() {
            return Err(IdentityError::EmailAlreadyInUse);
        }

        self.gate.check(&email, &profile).await?;

        if let Some(document) = request.verification_document.as_deref().map(str::trim) {
            if !document.is_empty() {
                profile.set_verification_document(document);
            }
        }

        let password_hash = self.passwords.hash(&request.password).await?;
        let account = Account::new(email, request.role, Some(password_hash));
        self.store.create_account(&account, &profile).await?;

        info!(
            account_id = %account.id,
            email = %redact_email(&account.email),
            status = %account.status,
            "Account created"
        );
        Ok(AccountView::new(account, profile))
    }

    /// Check email and password. Every way of failing this step produces the
    /// same `InvalidCredentials` error.
    async fn check_credentials(&self, email: &str, password: &str) -> Result<Account> {
        let email = normalize_email(email);
        let Some(account) = self.store.find_account_by_email(&email).await? else {
            return Err(IdentityError::InvalidCredentials);
        };
        if account.status == AccountStatus::Deleted {
            return Err(IdentityError::InvalidCredentials);
        }
        let Some(hash) = account.password_hash.as_deref() else {
            return Err(IdentityError::InvalidCredentials);
        };
        if !self.passwords.verify(password, hash).await? {
            return Err(IdentityError::InvalidCredentials);
        }
        Ok(account)
    }

    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let mut account = match self.check_credentials(email, password).await {
            Ok(account) => account,
            Err(e) => {
                info!(email = %redact_email(email), "Login rejected");
                return Err(e);
            }
        };
        ensure_active(&account)?;

        let access = self.tokens.issue_access(&account)?;
        let refresh = self.tokens.issue_refresh(account.id)?;
        let now = Utc::now();

        self.store
            .create_session(&Session {
                id: Uuid::new_v4(),
                account_id: account.id,
                token_hash: hash_refresh_token(&refresh.token),
                expires_at: refresh.expires_at,
                created_at: now,
            })
            .await?;
        self.store.record_login(account.id, now).await?;
        account.last_login_at = Some(now);

        let profile = self.load_profile(&account).await?;
        info!(account_id = %account.id, "Login succeeded");

        Ok(LoginResponse {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.tokens.access_ttl_secs(),
            account: AccountView::new(account, profile),
        })
    }

    /// Issue a new access credential; the refresh credential is not rotated
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessTokenResponse> {
        let token_hash = hash_refresh_token(refresh_token);

        let claims = match self.tokens.verify_refresh(refresh_token) {
            Ok(claims) => claims,
            Err(IdentityError::TokenExpired) => {
                self.discard_session(&token_hash).await;
                return Err(IdentityError::TokenExpired);
            }
            Err(e) => return Err(e),
        };

        let session = self
            .store
            .find_session(&token_hash)
            .await?
            .ok_or(IdentityError::InvalidSession)?;

        if session.is_expired(Utc::now()) {
            self.discard_session(&token_hash).await;
            return Err(IdentityError::InvalidSession);
        }
        if claims.account_id()? != session.account_id {
            return Err(IdentityError::InvalidSession);
        }

        let account = self
            .store
            .find_account_by_id(session.account_id)
            .await?
            .ok_or(IdentityError::InvalidSession)?;
        ensure_active(&account)?;

        let access = self.tokens.issue_access(&account)?;
        Ok(AccessTokenResponse {
            access_token: access.token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.tokens.access_ttl_secs(),
        })
    }

    /// Idempotent; failures are logged and swallowed
    pub async fn logout(&self, refresh_token: &str) {
        let token_hash = hash_refresh_token(refresh_token);
        match self.store.delete_session(&token_hash).await {
            Ok(true) => info!("Session closed"),
            Ok(false) => info!("Logout for unknown session"),
            Err(e) => warn!(error = %e, "Failed to delete session during logout"),
        }
    }

    async fn discard_session(&self, token_hash: &str) {
        if let Err(e) = self.store.delete_session(token_hash).await {
            warn!(error = %e, "Failed to delete expired session");
        }
    }

    /// Resolve a bearer access credential to its claims
    pub fn authenticate(&self, access_token: &str) -> Result<AccessClaims> {
        self.tokens.verify_access(access_token)
    }

    pub async fn get_account(&self, account_id: Uuid) -> Result<AccountView> {
        let account = self
            .store
            .find_account_by_id(account_id)
            .await?
            .ok_or(IdentityError::NotFound)?;
        let profile = self.load_profile(&account).await?;
        Ok(AccountView::new(account, profile))
    }

    /// Attach a stored document to a pending doctor/staff profile.
    /// Credentials are re-checked but the status gate is not applied.
    pub async fn attach_verification_document(
        &self,
        email: &str,
        password: &str,
        document_path: &str,
    ) -> Result<AccountView> {
        let account = self.check_credentials(email, password).await?;
        let mut profile = self.load_profile(&account).await?;

        if !profile.set_verification_document(document_path) {
            return Err(IdentityError::validation(
                "role",
                "Only doctor and staff accounts upload verification documents",
            ));
        }
        self.store.update_profile(account.id, &profile).await?;

        info!(account_id = %account.id, "Verification document attached");
        Ok(AccountView::new(account, profile))
    }

    /// Approve or reject a pending doctor/staff account
    #[instrument(skip(self))]
    pub async fn review_verification(
        &self,
        admin_id: Uuid,
        account_id: Uuid,
        decision: ReviewDecision,
    ) -> Result<AccountView> {
        self.require_admin(admin_id).await?;

        let mut account = self
            .store
            .find_account_by_id(account_id)
            .await?
            .ok_or(IdentityError::NotFound)?;
        let mut profile = self.load_profile(&account).await?;

        if !profile.apply_review(decision, admin_id, Utc::now()) {
            return Err(IdentityError::validation(
                "account_id",
                "Only doctor and staff accounts require verification review",
            ));
        }

        if decision == ReviewDecision::Approve && account.status == AccountStatus::PendingVerification {
            account.status = AccountStatus::Active;
        }
        self.store.save_review(account.id, &profile, account.status).await?;

        info!(account_id = %account.id, ?decision, status = %account.status, "Verification reviewed");
        Ok(AccountView::new(account, profile))
    }

    /// Suspend or reactivate an account
    #[instrument(skip(self))]
    pub async fn set_account_status(
        &self,
        admin_id: Uuid,
        account_id: Uuid,
        status: AccountStatus,
    ) -> Result<AccountView> {
        self.require_admin(admin_id).await?;

        if !matches!(status, AccountStatus::Active | AccountStatus::Suspended) {
            return Err(IdentityError::validation("status", "Status must be active or suspended"));
        }
        if admin_id == account_id {
            return Err(IdentityError::validation("account_id", "Admins cannot change their own status"));
        }

        let mut account = self
            .store
            .find_account_by_id(account_id)
            .await?
            .ok_or(IdentityError::NotFound)?;
        let profile = self.load_profile(&account).await?;

        if account.status == AccountStatus::Deleted {
            return Err(IdentityError::NotFound);
        }
        if status == AccountStatus::Active
            && profile.verification_status().is_some_and(|s| s != VerificationStatus::Approved)
        {
            return Err(IdentityError::validation(
                "status",
                "Pending doctor and staff accounts are activated through verification review",
            ));
        }

        self.store.update_account_status(account.id, status).await?;
        account.status = status;

        info!(account_id = %account.id, status = %status, "Account status changed");
        Ok(AccountView::new(account, profile))
    }

    /// Create the configured administrator if it does not exist yet
    pub async fn provision_admin(&self, email: &str, password: &str, full_name: &str) -> Result<AccountView> {
        let email = normalize_email(email);
        if let Some(existing) = self.store.find_account_by_email(&email).await? {
            if existing.role != Role::Admin {
                return Err(IdentityError::EmailAlreadyInUse);
            }
            let profile = self.load_profile(&existing).await?;
            return Ok(AccountView::new(existing, profile));
        }

        if password.chars().count() < self.passwords.min_length() {
            return Err(IdentityError::validation("password", "Admin password is too short"));
        }

        let profile = Profile::Admin(AdminProfile {
            full_name: full_name.trim().to_string(),
        });
        let password_hash = self.passwords.hash(password).await?;
        let account = Account::new(email, Role::Admin, Some(password_hash));
        self.store.create_account(&account, &profile).await?;

        info!(account_id = %account.id, "Administrator provisioned");
        Ok(AccountView::new(account, profile))
    }

    async fn require_admin(&self, admin_id: Uuid) -> Result<Account> {
        match self.store.find_account_by_id(admin_id).await? {
            Some(admin) if admin.role == Role::Admin && admin.status == AccountStatus::Active => Ok(admin),
            _ => Err(IdentityError::Forbidden("Administrator access required".to_string())),
        }
    }

    async fn load_profile(&self, account: &Account) -> Result<Profile> {
        load_profile(self.store.as_ref(), account).await
    }
}

/// Profile for `account`, checking the one-to-one role invariant
pub(crate) async fn load_profile(store: &dyn IdentityStore, account: &Account) -> Result<Profile> {
    match store.get_profile(account.id).await? {
        Some(profile) if profile.role() == account.role => Ok(profile),
        _ => Err(IdentityError::ProfileMismatch {
            account_id: account.id,
            role: account.role,
        }),
    }
}

fn ensure_active(account: &Account) -> Result<()> {
    match account.status {
        AccountStatus::Active => Ok(()),
        AccountStatus::Suspended => Err(IdentityError::AccountSuspended),
        AccountStatus::PendingVerification => Err(IdentityError::AccountPendingVerification),
        AccountStatus::Deleted => Err(IdentityError::InvalidCredentials),
    }
}
