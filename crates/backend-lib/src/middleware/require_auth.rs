// ============================
// crates/backend-lib/src/middleware/require_auth.rs
// ============================
//! Bearer-token guard for protected routes.
//!
//! Access tokens are checked statelessly: signature and expiry only,
//! no session-store round trip.
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use stayline_common::CurrentUser;

use crate::error::AppError;
use crate::AppState;

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidToken)?;

    if !state.codec.is_structurally_valid(token) {
        return Err(AppError::InvalidToken);
    }

    if state.codec.is_expired(token)? {
        return Err(AppError::InvalidToken);
    }

    let user = CurrentUser {
        email: state.codec.subject_of(token)?,
        role: state.codec.role_of(token)?,
    };
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
