//! Route path constants, relative to their nesting prefix

pub const API_V1: &str = "/api/v1";

pub mod health {
    pub const HEALTH: &str = "/health";
}

pub mod auth {
    pub const SIGNUP: &str = "/auth/signup";
    pub const LOGIN: &str = "/auth/login";
    pub const REFRESH: &str = "/auth/refresh";
    pub const LOGOUT: &str = "/auth/logout";
    pub const UPLOAD_VERIFICATION: &str = "/auth/upload-verification";
    pub const SYNC_EXTERNAL_USER: &str = "/auth/sync-external-user";
}

pub mod verify {
    pub const DOCTOR: &str = "/verify/doctor";
    pub const STAFF: &str = "/verify/staff";
}

pub mod profile {
    pub const OWN: &str = "/profile";
    pub const EXTERNAL: &str = "/external/profile";
}

pub mod admin {
    pub const ACCOUNT_VERIFICATION: &str = "/admin/accounts/:id/verification";
    pub const ACCOUNT_STATUS: &str = "/admin/accounts/:id/status";
}
