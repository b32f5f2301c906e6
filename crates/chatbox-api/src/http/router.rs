//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/` except `/health`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post, put};
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
        // Chats
        .route(
            "/chats",
            get(handlers::chat::list_chats).post(handlers::chat::create_chat),
        )
        .route(
            "/chats/{chat_id}",
            get(handlers::chat::get_chat)
                .patch(handlers::chat::update_chat)
                .delete(handlers::chat::delete_chat),
        )
        .route("/chats/{chat_id}/members", post(handlers::chat::add_member))
        .route(
            "/chats/{chat_id}/admins/{user_id}",
            put(handlers::chat::set_admin_role),
        )
        .route("/chats/{chat_id}/read", post(handlers::chat::mark_read))
        // Messages
        .route(
            "/chats/{chat_id}/messages",
            get(handlers::message::list_messages).post(handlers::message::send_message),
        )
        .route(
            "/messages/{message_id}",
            get(handlers::message::get_message)
                .patch(handlers::message::edit_message)
                .delete(handlers::message::delete_message),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::health::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
