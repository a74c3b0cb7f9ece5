//! Catalog handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::catalog::{GameUpdate, NewGame};
use crate::web::dto::{
    ApiResponse, CreateGameRequest, GameResponse, UpdateGameRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AdminUser;

/// GET /api/games - The whole catalog, by title.
pub async fn list_games(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<GameResponse>>>, ApiError> {
    let games = state.catalog.list().await?;
    Ok(Json(ApiResponse::new(
        games.into_iter().map(GameResponse::from).collect(),
    )))
}

/// GET /api/games/:id
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GameResponse>>, ApiError> {
    let game = state.catalog.get(id).await?;
    Ok(Json(ApiResponse::new(GameResponse::from(game))))
}

/// POST /api/games
pub async fn create_game(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ValidatedJson(req): ValidatedJson<CreateGameRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GameResponse>>), ApiError> {
    let game = state
        .catalog
        .create(NewGame::new(req.title, req.description, req.price_cents))
        .await?;
    tracing::info!(admin_id = %admin.id, game_id = %game.id, "Game created via API");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(GameResponse::from(game))),
    ))
}

/// PUT /api/games/:id
pub async fn update_game(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateGameRequest>,
) -> Result<Json<ApiResponse<GameResponse>>, ApiError> {
    let update = GameUpdate {
        title: req.title,
        description: req.description,
        price_cents: req.price_cents,
    };
    let game = state.catalog.update(id, update).await?;
    Ok(Json(ApiResponse::new(GameResponse::from(game))))
}

/// DELETE /api/games/:id
pub async fn delete_game(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
