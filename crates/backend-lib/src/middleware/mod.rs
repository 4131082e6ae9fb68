// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the Stayline backend.

pub mod require_auth;

pub use require_auth::require_auth;
