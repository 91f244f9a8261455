/**
 * Server Initialization
 *
 * Builds the Axum application:
 *
 * 1. Connect the conversation store and run migrations (fatal on failure)
 * 2. Create the shared state (pool + room registry)
 * 3. Spawn the periodic sweep of subscriber-less room channels
 * 4. Assemble the router
 */

use axum::Router;

use crate::backend::routes::create_router;
use crate::backend::server::config::{connect_database, ServerConfig};
use crate::backend::server::state::AppState;

/// How often subscriber-less room channels are swept
const ROOM_SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(300);

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails when the conversation store cannot be reached or migrated; the
/// server must not start without it.
pub async fn create_app(config: &ServerConfig) -> Result<Router, sqlx::Error> {
    tracing::info!("Initializing chat server");

    let pool = connect_database(&config.database_url).await?;
    let state = AppState::new(pool);

    // Rooms outlive the connections that created them; sweep the ones
    // nobody listens to anymore
    let rooms = state.rooms.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ROOM_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            rooms.cleanup_idle();
            tracing::debug!("swept idle room channels");
        }
    });

    Ok(create_router(state))
}
