//! Route handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod backup;
pub mod health;
