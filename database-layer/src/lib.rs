//! PostgreSQL access for MedGate
//!
//! Wraps a `sqlx` connection pool, carries the embedded schema migrations
//! for accounts, profiles, sessions and the credential registry, and
//! exposes helpers the repositories use to classify constraint failures.
//!
//! Repositories issue runtime-checked queries (`sqlx::query(..).bind(..)`)
//! against [`DatabasePool::pool`]; nothing here knows about the domain types.

pub mod connection;
pub mod error;

pub use connection::*;
pub use error::*;
