use async_trait::async_trait;
use stayline_common::{AuthResponse, RegisterRequest};

use crate::error::AppError;

/// What a logout call should invalidate. Resolved explicitly by the
/// caller rather than inferred from the shape of a string.
#[derive(Debug, Clone)]
pub enum LogoutTarget {
    /// Log out the single session behind this refresh token value
    ByToken(String),
    /// Log out every session of the account with this email
    ByAccount(String),
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError>;
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError>;
    async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, AppError>;
    async fn logout(&self, target: LogoutTarget) -> Result<(), AppError>;
}
