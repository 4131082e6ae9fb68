// ============================
// crates/backend-lib/src/routes.rs
// ============================
//! HTTP routing for the auth endpoints.
use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use stayline_common::{
    ApiResponse, AuthResponse, CurrentUser, LoginRequest, LogoutRequest, RefreshRequest,
    RegisterRequest,
};
use tower_http::trace::TraceLayer;

use crate::auth::{AuthService, LogoutTarget};
use crate::error::AppError;
use crate::middleware::require_auth;
use crate::validation;
use crate::AppState;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/auth/v1/me", get(me))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/auth/v1/register", post(register))
        .route("/auth/v1/login", post(login))
        .route("/auth/v1/refresh", post(refresh))
        .route("/auth/v1/logout", post(logout))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    validation::validate_name(&request.first_name)?;
    validation::validate_name(&request.last_name)?;
    validation::validate_email(&request.email)?;
    validation::validate_password(&request.password)?;
    if let Some(phone) = &request.phone_number {
        validation::validate_phone_number(phone)?;
    }
    if let Some(url) = &request.avatar_url {
        validation::validate_avatar_url(url)?;
    }

    let response = state.auth.register(request).await?;
    Ok(Json(ApiResponse::ok(response, "Registered")))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let response = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(ApiResponse::ok(response, "Logged in")))
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let response = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(ApiResponse::ok(response, "Token refreshed")))
}

/// Logout resolves its dual-purpose input into explicit targets here at
/// the call site; both are invoked when both fields are present.
async fn logout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogoutRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if let Some(token) = request.refresh_token {
        state.auth.logout(LogoutTarget::ByToken(token)).await?;
    }
    if let Some(email) = request.email {
        state.auth.logout(LogoutTarget::ByAccount(email)).await?;
    }

    Ok(Json(ApiResponse::ok_empty("Logged out")))
}

async fn me(Extension(user): Extension<CurrentUser>) -> Json<ApiResponse<CurrentUser>> {
    Json(ApiResponse::ok(user, "OK"))
}
