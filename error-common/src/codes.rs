// Standardized error codes for MedGate API responses

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
    pub const UNSUPPORTED_MEDIA: &str = "VALIDATION_1004";
}

pub mod authentication {
    pub const INVALID_CREDENTIALS: &str = "AUTH_2001";
    pub const TOKEN_INVALID: &str = "AUTH_2002";
    pub const SESSION_INVALID: &str = "AUTH_2003";
    pub const ACCOUNT_SUSPENDED: &str = "AUTH_2004";
    pub const ACCOUNT_PENDING_VERIFICATION: &str = "AUTH_2005";
    pub const TOKEN_EXPIRED: &str = "AUTH_2006";
}

pub mod authorization {
    pub const ACCESS_DENIED: &str = "AUTHZ_3001";
    pub const UID_MISMATCH: &str = "AUTHZ_3002";
}

pub mod verification {
    pub const DOCTOR_NOT_VERIFIED: &str = "VERIFY_4001";
    pub const STAFF_NOT_VERIFIED: &str = "VERIFY_4002";
    pub const DOMAIN_NOT_ALLOWED: &str = "VERIFY_4003";
}

pub mod resource {
    pub const NOT_FOUND: &str = "RESOURCE_5001";
    pub const EMAIL_IN_USE: &str = "RESOURCE_5002";
    pub const PROFILE_MISMATCH: &str = "RESOURCE_5003";
}

pub mod dependency {
    pub const REGISTRY_UNAVAILABLE: &str = "DEPENDENCY_6001";
    pub const STORE_UNAVAILABLE: &str = "DEPENDENCY_6002";
    pub const TOKEN_SERVICE: &str = "DEPENDENCY_6003";
}

pub mod system {
    pub const INTERNAL: &str = "SYSTEM_9001";
    pub const CONFIGURATION: &str = "SYSTEM_9002";
    pub const SERVER_FAILURE: &str = "SYSTEM_9003";
}
