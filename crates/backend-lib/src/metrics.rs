// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const ACCOUNT_REGISTERED: &str = "auth.account_registered";
pub const LOGIN_SUCCEEDED: &str = "auth.login_succeeded";
pub const LOGIN_FAILED: &str = "auth.login_failed";
pub const TOKEN_REFRESHED: &str = "auth.token_refreshed";
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_REVOKED: &str = "session.revoked";
