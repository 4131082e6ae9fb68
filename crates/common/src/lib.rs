// ================
// crates/common/src/lib.rs
// ================
//! Common types and structures
//! shared between the Stayline backend and its HTTP clients.
//! This module defines the auth request/response payloads and the
//! response envelope used by every endpoint.

use serde::{Deserialize, Serialize};

/// Registration payload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    /// Given name, required
    pub first_name: String,
    /// Family name, required
    pub last_name: String,
    /// Unique login email
    pub email: String,
    /// Plaintext password (min 6 chars)
    pub password: String,
    /// Optional contact number
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Optional avatar URL
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Login payload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh payload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefreshRequest {
    /// The refresh token string returned by register/login
    pub refresh_token: String,
}

/// Logout payload.
/// `refresh_token` logs out the single session behind that token;
/// `email` logs out every session of the account. Both may be given.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token pair returned by register/login/refresh
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    /// Short-lived signed access token
    pub access_token: String,
    /// Longer-lived refresh token, tracked server-side
    pub refresh_token: String,
    /// Role claim baked into the access token
    pub role: String,
}

/// Identity extracted from a verified access token
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CurrentUser {
    pub email: String,
    pub role: Option<String>,
}

/// Uniform response envelope
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    /// Successful response with a payload
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
        }
    }

    /// Successful response without a payload
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: message.into(),
        }
    }
}
