//! Common error handling utilities for MedGate
//!
//! Process-level error type shared by the binaries, plus the stable
//! machine-readable error codes that the HTTP layer attaches to every
//! error response.
//!
//! # Error Categories
//!
//! - **Validation**: malformed or missing input
//! - **Authentication**: bad credentials, invalid or expired tokens
//! - **Authorization**: role, ownership or UID mismatch
//! - **Verification**: doctor/staff credential checks that failed
//! - **Dependency**: credential registry, identity store or token service unreachable

pub mod codes;
pub mod types;

pub use types::*;
