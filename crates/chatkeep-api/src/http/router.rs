//! Axum router configuration with middleware.
//!
//! All routes are under `/api/`. Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Accounts
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/user", get(handlers::auth::current_user))
        // Settings
        .route(
            "/settings",
            get(handlers::settings::get_settings).post(handlers::settings::update_settings),
        )
        // Chats
        .route(
            "/chats",
            get(handlers::chat::list_chats)
                .post(handlers::chat::save_chat)
                .delete(handlers::chat::clear_chats),
        )
        .route("/chats/sorted", get(handlers::chat::list_chats_sorted))
        .route(
            "/chats/{id}",
            get(handlers::chat::get_chat).delete(handlers::chat::delete_chat),
        )
        .route("/generate-chat-id", get(handlers::chat::generate_chat_id))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /api/health - Liveness check (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
