use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Staff,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "patient" => Some(Role::Patient),
            "doctor" => Some(Role::Doctor),
            "staff" => Some(Role::Staff),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Doctors and staff start pending and need credential checks
    pub fn requires_verification(&self) -> bool {
        matches!(self, Role::Doctor | Role::Staff)
    }

    /// Status a freshly created account of this role starts in
    pub fn initial_status(&self) -> AccountStatus {
        if self.requires_verification() {
            AccountStatus::PendingVerification
        } else {
            AccountStatus::Active
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account lifecycle: `PendingVerification → Active → Suspended | Deleted`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    PendingVerification,
    Active,
    Suspended,
    Deleted,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::PendingVerification => "pending_verification",
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending_verification" => Some(AccountStatus::PendingVerification),
            "active" => Some(AccountStatus::Active),
            "suspended" => Some(AccountStatus::Suspended),
            "deleted" => Some(AccountStatus::Deleted),
            _ => None,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    /// Argon2id PHC string; `None` for accounts provisioned by the identity bridge
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub role: Role,
    pub email_verified: bool,
    pub external_uid: Option<String>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(email: String, role: Role, password_hash: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            role,
            email_verified: false,
            external_uid: None,
            status: role.initial_status(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub full_name: String,
    pub specialization: String,
    pub license_number: String,
    pub medical_council: String,
    pub verification_status: VerificationStatus,
    pub verification_document: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub full_name: String,
    pub organization_id: String,
    pub employee_id: String,
    pub department: String,
    pub verification_status: VerificationStatus,
    pub verification_document: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub full_name: String,
}

/// Role-specific profile; exactly one per account and its variant always
/// matches the account role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Profile {
    Patient(PatientProfile),
    Doctor(DoctorProfile),
    Staff(StaffProfile),
    Admin(AdminProfile),
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Patient(_) => Role::Patient,
            Profile::Doctor(_) => Role::Doctor,
            Profile::Staff(_) => Role::Staff,
            Profile::Admin(_) => Role::Admin,
        }
    }

    pub fn full_name(&self) -> &str {
        match self {
            Profile::Patient(p) => &p.full_name,
            Profile::Doctor(p) => &p.full_name,
            Profile::Staff(p) => &p.full_name,
            Profile::Admin(p) => &p.full_name,
        }
    }

    pub fn verification_status(&self) -> Option<VerificationStatus> {
        match self {
            Profile::Doctor(p) => Some(p.verification_status),
            Profile::Staff(p) => Some(p.verification_status),
            Profile::Patient(_) | Profile::Admin(_) => None,
        }
    }

    /// Record an uploaded verification document.
    /// Returns false for variants that are never verified.
    pub fn set_verification_document(&mut self, path: impl Into<String>) -> bool {
        match self {
            Profile::Doctor(p) => {
                p.verification_document = Some(path.into());
                true
            }
            Profile::Staff(p) => {
                p.verification_document = Some(path.into());
                true
            }
            Profile::Patient(_) | Profile::Admin(_) => false,
        }
    }

    /// Apply an admin decision. Returns false for variants that are never verified.
    pub fn apply_review(&mut self, decision: ReviewDecision, reviewer: Uuid, at: DateTime<Utc>) -> bool {
        let status = match decision {
            ReviewDecision::Approve => VerificationStatus::Approved,
            ReviewDecision::Reject => VerificationStatus::Rejected,
        };
        let (verification_status, verified_at, verified_by) = match self {
            Profile::Doctor(p) => (&mut p.verification_status, &mut p.verified_at, &mut p.verified_by),
            Profile::Staff(p) => (&mut p.verification_status, &mut p.verified_at, &mut p.verified_by),
            Profile::Patient(_) | Profile::Admin(_) => return false,
        };

        *verification_status = status;
        *verified_at = Some(at);
        *verified_by = Some(reviewer);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub account_id: Uuid,
    /// SHA-256 digest of the refresh credential, never the credential itself
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Non-secret account fields plus the profile, as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub email_verified: bool,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_uid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub profile: Profile,
}

impl AccountView {
    pub fn new(account: Account, profile: Profile) -> Self {
        Self {
            id: account.id,
            email: account.email,
            role: account.role,
            email_verified: account.email_verified,
            status: account.status,
            external_uid: account.external_uid,
            created_at: account.created_at,
            last_login_at: account.last_login_at,
            profile,
        }
    }
}

/// Role-specific signup fields. Which ones are required depends on the role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileFields {
    #[serde(default)]
    pub full_name: String,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub medical_council: Option<String>,
    pub organization_id: Option<String>,
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(flatten)]
    pub fields: ProfileFields,
    /// Path of a document already stored by the upload endpoint
    pub verification_document: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalSyncRequest {
    pub external_uid: String,
    pub email: String,
    pub role: Role,
    #[serde(flatten)]
    pub fields: ProfileFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub account: AccountView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
