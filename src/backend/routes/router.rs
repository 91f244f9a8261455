/**
 * Router Configuration
 *
 * The chat server's HTTP surface is deliberately small:
 *
 * - `GET /ws/chat` - the WebSocket chat transport (credential-gated)
 * - `GET /health`  - liveness probe
 *
 * Everything else (product/cart/order CRUD, the GraphQL mirror, static
 * frontend files) lives in the storefront's other services and never
 * enters this process.
 */

use axum::Router;

use crate::backend::chat::socket::chat_socket;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ws/chat", axum::routing::get(chat_socket))
        .route("/health", axum::routing::get(health))
        .fallback(|| async { "404 Not Found" })
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
