//! Account management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::account::Account;
use crate::web::dto::{
    AccountSummary, ApiResponse, ChangePasswordRequest, LockRequest, UpdateProfileRequest,
    ValidatedJson, ValidatedJsonOrDefault,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AdminUser, AuthUser};

type AccountJson = Json<ApiResponse<AccountSummary>>;

fn account_json(account: &Account) -> AccountJson {
    Json(ApiResponse::new(AccountSummary::from(account)))
}

/// GET /api/users - All accounts.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<AccountSummary>>>, ApiError> {
    let accounts = state.accounts.list().await?;
    let summaries = accounts.iter().map(AccountSummary::from).collect();
    Ok(Json(ApiResponse::new(summaries)))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<AccountJson, ApiError> {
    user.ensure_self_or_admin(id)?;
    let account = state.accounts.get(id).await?;
    Ok(account_json(&account))
}

/// PUT /api/users/:id - Change name and email.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<AccountJson, ApiError> {
    user.ensure_self_or_admin(id)?;
    let account = state
        .accounts
        .update_profile(id, &req.name, &req.email)
        .await?;
    Ok(account_json(&account))
}

/// PUT /api/users/:id/password - Only the account holder may change it.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    if user.id != id {
        return Err(ApiError::forbidden(
            "Passwords can only be changed by the account holder",
        ));
    }
    state
        .accounts
        .change_password(id, &req.current_password, &req.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.accounts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/:id/activate
pub async fn activate_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<AccountJson, ApiError> {
    Ok(account_json(&state.accounts.activate(id).await?))
}

/// POST /api/users/:id/deactivate
pub async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<AccountJson, ApiError> {
    Ok(account_json(&state.accounts.deactivate(id).await?))
}

/// POST /api/users/:id/lock - Body `{"minutes": n}` is optional.
pub async fn lock_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    ValidatedJsonOrDefault(req): ValidatedJsonOrDefault<LockRequest>,
) -> Result<AccountJson, ApiError> {
    let duration = req.minutes.map(|m| Duration::minutes(i64::from(m)));
    Ok(account_json(&state.accounts.lock(id, duration).await?))
}

/// POST /api/users/:id/unlock
pub async fn unlock_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<AccountJson, ApiError> {
    Ok(account_json(&state.accounts.unlock(id).await?))
}

/// POST /api/users/:id/promote
pub async fn promote_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<AccountJson, ApiError> {
    Ok(account_json(&state.accounts.promote_to_admin(id).await?))
}

/// POST /api/users/:id/demote
pub async fn demote_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<AccountJson, ApiError> {
    Ok(account_json(&state.accounts.demote_from_admin(id).await?))
}
