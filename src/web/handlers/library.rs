//! Game library handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::web::dto::{
    ApiResponse, LibraryEntryResponse, LibraryItemResponse, LibraryQuery, OwnershipResponse,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// Resolve whose library a request acts on. Only administrators may name
/// another account, and that account must exist.
async fn target_account(
    state: &AppState,
    user: &AuthUser,
    query: &LibraryQuery,
) -> Result<Uuid, ApiError> {
    match query.user_id {
        None => Ok(user.id),
        Some(id) if id == user.id => Ok(id),
        Some(id) => {
            user.ensure_self_or_admin(id)?;
            state.accounts.get(id).await?;
            Ok(id)
        }
    }
}

/// GET /api/library
pub async fn list_library(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<LibraryQuery>,
) -> Result<Json<ApiResponse<Vec<LibraryItemResponse>>>, ApiError> {
    let account_id = target_account(&state, &user, &query).await?;
    let items = state.library.list_for(account_id).await?;
    Ok(Json(ApiResponse::new(
        items.into_iter().map(LibraryItemResponse::from).collect(),
    )))
}

/// POST /api/library/:game_id - Buy a game at its current price.
pub async fn add_to_library(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(game_id): Path<Uuid>,
    Query(query): Query<LibraryQuery>,
) -> Result<(StatusCode, Json<ApiResponse<LibraryItemResponse>>), ApiError> {
    let account_id = target_account(&state, &user, &query).await?;
    let item = state.library.add(account_id, game_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(LibraryItemResponse::from(item))),
    ))
}

/// DELETE /api/library/:game_id
pub async fn remove_from_library(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(game_id): Path<Uuid>,
    Query(query): Query<LibraryQuery>,
) -> Result<StatusCode, ApiError> {
    let account_id = target_account(&state, &user, &query).await?;
    state.library.remove(account_id, game_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/library/entries/:id - Visible to the owner and administrators.
pub async fn get_library_entry(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LibraryEntryResponse>>, ApiError> {
    let entry = state.library.get(id).await?;
    if entry.account_id != user.id && !user.is_admin() {
        // Same answer as a missing entry
        return Err(ApiError::not_found("Library entry not found"));
    }
    Ok(Json(ApiResponse::new(LibraryEntryResponse::from(entry))))
}

/// GET /api/library/owns/:game_id
pub async fn owns_game(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(game_id): Path<Uuid>,
    Query(query): Query<LibraryQuery>,
) -> Result<Json<ApiResponse<OwnershipResponse>>, ApiError> {
    let account_id = target_account(&state, &user, &query).await?;
    let owned = state.library.owns(account_id, game_id).await?;
    Ok(Json(ApiResponse::new(OwnershipResponse { game_id, owned })))
}
