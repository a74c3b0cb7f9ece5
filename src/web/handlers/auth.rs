//! Authentication handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use super::AppState;
use crate::account::AccountError;
use crate::web::dto::{
    AccountSummary, ApiResponse, AuthResponse, LoginRequest, RegisterRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// POST /api/auth/register - Create an account and sign in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let result = state
        .accounts
        .register(&req.name, &req.email, &req.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(AuthResponse::from(result))),
    ))
}

/// POST /api/auth/login - Exchange credentials for a token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let result = state.accounts.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::new(AuthResponse::from(result))))
}

/// GET /api/auth/me - The signed-in account.
pub async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<AccountSummary>>, ApiError> {
    let account = state.accounts.get(user.id).await.map_err(|e| match e {
        // Token outlived its account
        AccountError::NotFound => ApiError::unauthorized("Account no longer exists"),
        other => other.into(),
    })?;
    Ok(Json(ApiResponse::new(AccountSummary::from(&account))))
}
