pub mod admin;
pub mod auth;
pub mod bridge;
pub mod health;
pub mod profile;
pub mod verify;
