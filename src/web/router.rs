//! Router configuration for Web API.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    activate_user, add_to_library, change_password, create_game, deactivate_user, delete_game,
    delete_user, demote_user, get_game, get_library_entry, get_user, health, list_games,
    list_library, list_users, lock_user, login, me, owns_game, ping, promote_user, register,
    remove_from_library, render_metrics, unlock_user, update_game, update_user, AppState,
};
use super::middleware::{
    audit, create_cors_layer, metrics, rate_limit, token_auth, track_metrics,
};

/// Create the main router: `/api`, health and metrics routes behind the
/// trace, CORS, audit, metrics, rate limit and token layers (outermost first).
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    metrics::describe(&app_state.metrics);

    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me));

    let user_routes = Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/password", put(change_password))
        .route("/:id/activate", post(activate_user))
        .route("/:id/deactivate", post(deactivate_user))
        .route("/:id/lock", post(lock_user))
        .route("/:id/unlock", post(unlock_user))
        .route("/:id/promote", post(promote_user))
        .route("/:id/demote", post(demote_user));

    let game_routes = Router::new()
        .route("/", get(list_games).post(create_game))
        .route("/:id", get(get_game).put(update_game).delete(delete_game));

    let library_routes = Router::new()
        .route("/", get(list_library))
        .route("/entries/:id", get(get_library_entry))
        .route("/owns/:game_id", get(owns_game))
        .route("/:game_id", post(add_to_library).delete(remove_from_library));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/games", game_routes)
        .nest("/library", library_routes);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health))
        .route("/health/ping", get(ping))
        .route("/metrics", get(render_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn_with_state(
                    app_state.token_issuer(),
                    audit,
                ))
                .layer(middleware::from_fn_with_state(
                    app_state.metrics.clone(),
                    track_metrics,
                ))
                .layer(middleware::from_fn_with_state(app_state.clone(), rate_limit))
                .layer(middleware::from_fn_with_state(
                    app_state.token_issuer(),
                    token_auth,
                )),
        )
        .with_state(app_state)
}
